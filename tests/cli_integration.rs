use cryptovault::types::DerivedBundle;
use serde_json::Value;
use std::process::Output;

const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn cli() -> assert_cmd::Command {
    let binary_path = assert_cmd::cargo::cargo_bin!("cryptovault");
    let mut cmd = assert_cmd::Command::new(binary_path);
    for var in [
        "CRYPTOVAULT_ALCHEMY_API_KEY",
        "CRYPTOVAULT_DEVNET_RPC_URL",
        "CRYPTOVAULT_MAINNET_RPC_URL",
        "CRYPTOVAULT_PRICE_API_URL",
        "CRYPTOVAULT_HTTP_TIMEOUT_SECS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_of(output: &Output) -> String {
    assert!(output.status.success(), "cli exited unsuccessfully: {:?}", output);
    String::from_utf8(output.stdout.clone()).expect("stdout is utf8")
}

fn bundle_from(output: &Output) -> DerivedBundle {
    let stdout = stdout_of(output);

    // sanity check: ensure output parses as json before struct deserialization
    let _: Value = serde_json::from_str(&stdout).expect("stdout is valid json");
    serde_json::from_str(&stdout).expect("json matches DerivedBundle schema")
}

fn derive_abandon(accounts: &str) -> DerivedBundle {
    let output = cli()
        .args(["derive", "--phrase", ABANDON_ABOUT, "--accounts", accounts, "--json"])
        .output()
        .expect("cli run succeeds");
    bundle_from(&output)
}

#[test]
fn generate_emits_valid_phrase_and_wallet() {
    let output = cli()
        .args(["generate", "--json"])
        .output()
        .expect("cli run succeeds");
    let bundle = bundle_from(&output);

    assert_eq!(bundle.word_count, 12);
    assert_eq!(bundle.mnemonic.split(' ').count(), 12);
    assert_eq!(bundle.wallets.len(), 1);

    let wallet = &bundle.wallets[0];
    assert_eq!(wallet.index, 0);
    assert_eq!(wallet.path, "m/44'/501'/0'");

    let public = bs58::decode(&wallet.address).into_vec().expect("address is base58");
    assert_eq!(public.len(), 32);

    let secret = hex::decode(&wallet.private_key_hex).expect("private key hex");
    assert_eq!(secret.len(), 64);
    assert_eq!(&secret[32..], public.as_slice(), "keypair ends with the public key");
    assert_eq!(bs58::encode(&secret).into_string(), wallet.private_key_base58);
}

#[test]
fn generate_honours_word_count() {
    let output = cli()
        .args(["generate", "--words", "24", "--accounts", "3", "--json"])
        .output()
        .expect("cli run succeeds");
    let bundle = bundle_from(&output);

    assert_eq!(bundle.word_count, 24);
    let indexes: Vec<u32> = bundle.wallets.iter().map(|w| w.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
}

#[test]
fn derive_is_deterministic() {
    let first = derive_abandon("2");
    let second = derive_abandon("2");

    assert_eq!(first.wallets.len(), 2);
    assert_eq!(first.wallets[0].path, "m/44'/501'/0'");
    assert_eq!(first.wallets[1].path, "m/44'/501'/1'");
    assert_ne!(first.wallets[0].address, first.wallets[1].address);

    for (a, b) in first.wallets.iter().zip(&second.wallets) {
        assert_eq!(a.address, b.address);
        assert_eq!(a.private_key_hex, b.private_key_hex);
    }
}

#[test]
fn derive_from_stdin_with_start_index() {
    let output = cli()
        .args(["derive", "--stdin", "--start", "1", "--json"])
        .write_stdin(format!("  {}\n", ABANDON_ABOUT.to_uppercase()))
        .output()
        .expect("cli run succeeds");
    let bundle = bundle_from(&output);

    assert_eq!(bundle.wallets.len(), 1);
    assert_eq!(bundle.wallets[0].index, 1);
    assert_eq!(bundle.wallets[0].address, derive_abandon("2").wallets[1].address);
}

#[test]
fn derive_rejects_bad_checksum_unless_lenient() {
    let bad = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";

    let strict = cli()
        .args(["derive", "--phrase", bad, "--json"])
        .output()
        .expect("cli run succeeds");
    assert!(!strict.status.success());
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("Error:"), "stderr: {}", stderr);

    let lenient = cli()
        .args(["derive", "--phrase", bad, "--lenient", "--json"])
        .output()
        .expect("cli run succeeds");
    let bundle = bundle_from(&lenient);
    assert_eq!(bundle.wallets.len(), 1);
}

#[test]
fn balance_rejects_invalid_address() {
    let output = cli()
        .args(["balance", "--address", "not-a-solana-address"])
        .output()
        .expect("cli run succeeds");
    assert!(!output.status.success());
}

#[test]
fn interactive_indexes_survive_deletion() {
    let output = cli()
        .arg("interactive")
        .write_stdin("generate\ncontinue\nnew\nnew\ndelete 0\nlist\nquit\n")
        .output()
        .expect("cli run succeeds");
    let stdout = stdout_of(&output);

    let tail = stdout
        .split("Wallets (1):")
        .nth(1)
        .expect("list output present");
    assert!(tail.contains("#1 "), "tail: {}", tail);
    assert!(!tail.contains("#0 "), "tail: {}", tail);
}

#[test]
fn interactive_keeps_going_after_errors() {
    let output = cli()
        .write_stdin("new\nfrobnicate\nuse abandon abandon\nshow\nquit\n")
        .output()
        .expect("cli run succeeds");
    let stdout = stdout_of(&output);

    assert!(stdout.contains("Error: Cannot add a wallet in the Start step"));
    assert!(stdout.contains("Error: unknown command: frobnicate"));
    assert!(stdout.contains("Error: Invalid mnemonic"));
}

#[test]
fn interactive_copy_never_writes_secret_into_a_pipe() {
    let output = cli()
        .write_stdin(format!("use {}\nnew\ncopy key 0\nkey 0\ncopy key 0\ncopy address 0\nquit\n", ABANDON_ABOUT))
        .output()
        .expect("cli run succeeds");
    let stdout = stdout_of(&output);

    assert!(stdout.contains("Error: Show the private key before copying it"));
    assert!(!stdout.contains("\x1b]52"), "escape sequence leaked into stdout");
    assert!(!stdout.contains("Copied!"));
    assert_eq!(stdout.matches("Could not copy to the clipboard").count(), 2);
}
