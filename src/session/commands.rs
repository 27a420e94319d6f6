//! Interactive command loop
//!
//! Line-oriented front end for a [`Session`]. Every command maps onto one
//! session operation; failures are printed and the loop carries on.

use std::io::{BufRead, Write};

use super::{KeyFormat, Session, Step};
use crate::error::VaultResult;
use crate::types::Network;
use crate::wallet::MnemonicStrength;

pub const PROMPT: &str = "cryptovault> ";

pub const HELP: &str = "\
Commands:
  generate [words]         new secret phrase (12, 15, 18, 21 or 24 words)
  use <phrase...>          load an existing secret phrase
  continue                 derive wallets from the generated phrase
  reveal | hide            show or mask the secret phrase
  copy phrase              copy the revealed phrase
  new                      derive the next wallet
  delete <i>               remove wallet #i
  list                     list wallet addresses
  balance <i>              fetch the balance of wallet #i
  balances                 fetch every balance
  network <devnet|mainnet> select the cluster for balance lookups
  key <i>                  show or hide the private key of wallet #i
  copy address <i>         copy the address of wallet #i
  copy key <i> [base58]    copy the shown private key of wallet #i (hex by default)
  price                    current SOL price in USD
  show                     redraw the current screen
  help                     this text
  quit                     leave";

/// One parsed line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate(MnemonicStrength),
    Use(String),
    Continue,
    Reveal,
    Hide,
    CopyPhrase,
    New,
    Delete(u32),
    List,
    Balance(u32),
    Balances,
    Network(Network),
    Key(u32),
    CopyAddress(u32),
    CopyKey(u32, KeyFormat),
    Price,
    Show,
    Help,
    Quit,
}

fn parse_index(arg: Option<&str>) -> Result<u32, String> {
    let arg = arg.ok_or_else(|| "missing wallet index".to_string())?;
    arg.trim_start_matches('#')
        .parse()
        .map_err(|_| format!("invalid wallet index: {}", arg))
}

impl Command {
    /// `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(None);
        };

        let command = match verb.to_lowercase().as_str() {
            "generate" | "gen" => match parts.next() {
                Some(words) => {
                    let words: usize = words.parse().map_err(|_| format!("invalid word count: {}", words))?;
                    Command::Generate(MnemonicStrength::from_word_count(words).map_err(|e| e.message)?)
                }
                None => Command::Generate(MnemonicStrength::default()),
            },
            "use" => {
                let phrase = parts.collect::<Vec<_>>().join(" ");
                if phrase.is_empty() {
                    return Err("usage: use <phrase...>".to_string());
                }
                Command::Use(phrase)
            }
            "continue" | "next" => Command::Continue,
            "reveal" => Command::Reveal,
            "hide" => Command::Hide,
            "new" | "add" => Command::New,
            "delete" | "rm" => Command::Delete(parse_index(parts.next())?),
            "list" | "ls" => Command::List,
            "balance" => Command::Balance(parse_index(parts.next())?),
            "balances" | "refresh" => Command::Balances,
            "network" => {
                let name = parts.next().ok_or_else(|| "usage: network <devnet|mainnet>".to_string())?;
                Command::Network(name.parse()?)
            }
            "key" => Command::Key(parse_index(parts.next())?),
            "copy" => match parts.next() {
                Some("phrase") => Command::CopyPhrase,
                Some("address") => Command::CopyAddress(parse_index(parts.next())?),
                Some("key") => {
                    let index = parse_index(parts.next())?;
                    let format = match parts.next() {
                        None | Some("hex") => KeyFormat::Hex,
                        Some("base58") | Some("b58") => KeyFormat::Base58,
                        Some(other) => return Err(format!("unknown key format: {} (use hex or base58)", other)),
                    };
                    Command::CopyKey(index, format)
                }
                _ => return Err("usage: copy phrase | copy address <i> | copy key <i> [hex|base58]".to_string()),
            },
            "price" => Command::Price,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {} (try `help`)", other)),
        };
        Ok(Some(command))
    }
}

fn copied_message(copied: bool) -> &'static str {
    if copied {
        "Copied!"
    } else {
        "Could not copy to the clipboard"
    }
}

/// Apply one command; returns the text to print
pub fn execute(session: &mut Session, command: Command) -> VaultResult<String> {
    let text = match command {
        Command::Generate(strength) => {
            session.generate_phrase(strength)?;
            session.render()
        }
        Command::Use(phrase) => {
            session.use_existing_phrase(&phrase)?;
            session.render()
        }
        Command::Continue => {
            session.continue_to_wallets()?;
            session.render()
        }
        Command::Reveal => {
            session.set_phrase_revealed(true)?;
            session.render()
        }
        Command::Hide => {
            session.set_phrase_revealed(false)?;
            session.render()
        }
        Command::CopyPhrase => copied_message(session.copy_phrase()?).to_string(),
        Command::New => {
            let index = session.add_wallet()?;
            let address = session
                .registry()
                .and_then(|r| r.get(index))
                .map(|w| w.address().to_string())
                .unwrap_or_default();
            format!("Wallet #{} {}", index, address)
        }
        Command::Delete(index) => {
            if session.remove_wallet(index)? {
                format!("Deleted wallet #{}", index)
            } else {
                format!("No wallet #{}", index)
            }
        }
        Command::List => list_wallets(session),
        Command::Balance(index) => match session.fetch_balance(index)? {
            Some(_) => session.render(),
            None => format!("Balance of wallet #{} unavailable", index),
        },
        Command::Balances => {
            let fetched = session.refresh_balances()?;
            let total = session.registry().map(|r| r.len()).unwrap_or(0);
            format!("Fetched {}/{} balances\n{}", fetched, total, session.render())
        }
        Command::Network(network) => {
            session.select_network(network)?;
            session.render()
        }
        Command::Key(index) => {
            session.toggle_private_key(index)?;
            session.render()
        }
        Command::CopyAddress(index) => copied_message(session.copy_address(index)?).to_string(),
        Command::CopyKey(index, format) => copied_message(session.copy_private_key(index, format)?).to_string(),
        Command::Price => {
            let quote = session.price();
            if quote.is_fallback {
                format!("SOL ≈ ${:.2} USD (fallback)", quote.usd)
            } else {
                format!("SOL ≈ ${:.2} USD", quote.usd)
            }
        }
        Command::Show => session.render(),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(text)
}

fn list_wallets(session: &Session) -> String {
    if session.step() != Step::Wallets {
        return "No wallets yet".to_string();
    }

    let addresses = session.registry().map(|r| r.addresses()).unwrap_or_default();
    let mut out = format!("Wallets ({}):", addresses.len());
    for (index, address) in addresses {
        out.push_str(&format!("\n  #{} {}", index, address));
    }
    out
}

/// Read commands until `quit` or end of input
pub fn run_interactive<R, W>(session: &mut Session, input: R, mut output: W) -> VaultResult<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", session.render())?;
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => match execute(session, command) {
                Ok(text) => writeln!(output, "{}", text.trim_end())?,
                Err(e) => writeln!(output, "Error: {}", e.message)?,
            },
            Err(message) => writeln!(output, "Error: {}", message)?,
        }
        write!(output, "{}", PROMPT)?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}
