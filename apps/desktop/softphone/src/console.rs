//! Line-oriented console front end.
//!
//! Typed lines become [`Intent`]s; [`UiUpdate`]s become printable lines.
//! Nothing here touches session state directly.

use crate::error::SoftphoneError;

use call_core::codec::HangupTarget;
use call_core::session::{Intent, Screen, SessionSnapshot, UiUpdate};

use models::{Call, Contact, HistoryFilter, SipSettings};

use std::time::{Duration, Instant};

pub const HELP: &str = "\
Commands:
  call <number>              place a call
  call! <number>             place a call while another is active
  answer <id>                answer an incoming call
  hangup <id|all>            hang up one call or every call
  mute [<id> on|off]         set mute, or toggle it on the active call
  hold [<id> on|off]         set hold, or toggle it on the active call
  switch <id>                make another call active
  merge [<id> <id>...]       conference the given calls, or every call
  add <id>                   add a call to the conference
  endconf                    end the conference
  sip                        show SIP settings
  register <user> <password> <domain> [proxy]
  unregister
  audio                      list audio devices
  audio-set <input> <output> select audio devices
  audio-test                 play a test sound
  history [all|incoming|outgoing|missed]
  history-clear
  contacts                   list contacts
  contact-add <name> <number> [email]
  contact-del <id>
  search <query>
  status                     show the session
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Intent(Intent),
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, SoftphoneError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "call" | "call!" => ConsoleCommand::Intent(Intent::PlaceCall {
            number: required(&args, 0, "number")?.to_string(),
            confirmed: verb.ends_with('!'),
        }),
        "answer" => ConsoleCommand::Intent(Intent::Answer {
            call_id: required(&args, 0, "call id")?.to_string(),
        }),
        "hangup" => ConsoleCommand::Intent(Intent::Hangup(HangupTarget::parse(required(
            &args, 0, "call id",
        )?))),
        "mute" => match args.as_slice() {
            [] => ConsoleCommand::Intent(Intent::ToggleMute),
            [call_id, flag] => ConsoleCommand::Intent(Intent::SetMute {
                call_id: call_id.to_string(),
                muted: parse_flag(flag)?,
            }),
            _ => return Err(SoftphoneError::console("usage: mute [<id> on|off]")),
        },
        "hold" => match args.as_slice() {
            [] => ConsoleCommand::Intent(Intent::ToggleHold),
            [call_id, flag] => ConsoleCommand::Intent(Intent::SetHold {
                call_id: call_id.to_string(),
                on_hold: parse_flag(flag)?,
            }),
            _ => return Err(SoftphoneError::console("usage: hold [<id> on|off]")),
        },
        "switch" => ConsoleCommand::Intent(Intent::SwitchActive {
            call_id: required(&args, 0, "call id")?.to_string(),
        }),
        "merge" if args.is_empty() => ConsoleCommand::Intent(Intent::MergeActiveCalls),
        "merge" => ConsoleCommand::Intent(Intent::MergeToConference {
            call_ids: args.iter().map(|id| id.to_string()).collect(),
        }),
        "add" => ConsoleCommand::Intent(Intent::AddToConference {
            call_id: required(&args, 0, "call id")?.to_string(),
        }),
        "endconf" => ConsoleCommand::Intent(Intent::EndConference),
        "sip" => ConsoleCommand::Intent(Intent::RequestSipSettings),
        "register" => {
            if args.len() < 3 {
                return Err(SoftphoneError::console(
                    "usage: register <user> <password> <domain> [proxy]",
                ));
            }
            ConsoleCommand::Intent(Intent::RegisterSip(SipSettings::new(
                args[0],
                args[1],
                args[2],
                args.get(3).copied().unwrap_or_default(),
            )))
        }
        "unregister" => ConsoleCommand::Intent(Intent::UnregisterSip),
        "audio" => ConsoleCommand::Intent(Intent::RequestAudioDevices),
        "audio-set" => ConsoleCommand::Intent(Intent::SetAudioDevices {
            input_device: parse_device(required(&args, 0, "input device")?)?,
            output_device: parse_device(required(&args, 1, "output device")?)?,
        }),
        "audio-test" => ConsoleCommand::Intent(Intent::TestAudio),
        "history" => {
            let raw = args.first().copied().unwrap_or_default();
            let filter = HistoryFilter::parse(raw)
                .ok_or_else(|| SoftphoneError::console(format!("unknown history filter: {raw}")))?;
            ConsoleCommand::Intent(Intent::RequestCallHistory(filter))
        }
        "history-clear" => ConsoleCommand::Intent(Intent::ClearCallHistory),
        "contacts" => ConsoleCommand::Intent(Intent::RequestContacts),
        "contact-add" => ConsoleCommand::Intent(Intent::SaveContact(Contact {
            id: None,
            name: required(&args, 0, "name")?.to_string(),
            number: required(&args, 1, "number")?.to_string(),
            email: args.get(2).map(|email| email.to_string()),
        })),
        "contact-del" => ConsoleCommand::Intent(Intent::DeleteContact {
            contact_id: required(&args, 0, "contact id")?.to_string(),
        }),
        "search" => ConsoleCommand::Intent(Intent::SearchContacts {
            query: args.join(" "),
        }),
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(SoftphoneError::console(format!("unknown command: {other}"))),
    };

    Ok(Some(command))
}

fn required<'a>(args: &[&'a str], index: usize, what: &str) -> Result<&'a str, SoftphoneError> {
    args.get(index)
        .copied()
        .ok_or_else(|| SoftphoneError::console(format!("missing {what}")))
}

fn parse_flag(raw: &str) -> Result<bool, SoftphoneError> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(SoftphoneError::console(format!("expected on/off, got {other}"))),
    }
}

fn parse_device(raw: &str) -> Result<i64, SoftphoneError> {
    raw.parse()
        .map_err(|_| SoftphoneError::console(format!("invalid device id: {raw}")))
}

/// Printable form of an update, `None` for updates the console skips.
pub fn render(update: &UiUpdate) -> Option<String> {
    let line = match update {
        UiUpdate::Screen(screen) => format!("== {} ==", screen_name(*screen)),
        UiUpdate::Status(message) => format!("* {message}"),
        UiUpdate::Ring { call_id, number } => {
            format!("Incoming call from {} (answer {call_id})", display_number(number))
        }
        UiUpdate::CallUpdated(call) => format!("Call {}", describe_call(call)),
        UiUpdate::CallRemoved { call_id } => format!("Call {call_id} ended"),
        UiUpdate::ActiveCallChanged { call_id: Some(call_id) } => {
            format!("Active call: {call_id}")
        }
        UiUpdate::ActiveCallChanged { call_id: None } => return None,
        UiUpdate::ConferenceUpdated(Some(group)) => format!(
            "Conference {}: {}",
            group.display_name(),
            group.member_ids().collect::<Vec<_>>().join(", ")
        ),
        UiUpdate::ConferenceUpdated(None) => "No active conference calls".to_string(),
        UiUpdate::SessionReset => return None,
        // Ticks every second; the status command shows the current value.
        UiUpdate::Duration { .. } => return None,
        UiUpdate::Registration { registered } => format!(
            "Registration: {}",
            if *registered {
                "Registered"
            } else {
                "Not Registered"
            }
        ),
        UiUpdate::AudioDevices(devices) => {
            let list = |devices: &[models::AudioDevice]| {
                devices
                    .iter()
                    .map(|device| format!("{}={}", device.id, device.name))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "Input devices: {}\nOutput devices: {}",
                list(&devices.input),
                list(&devices.output)
            )
        }
        UiUpdate::AudioSettings(settings) => format!(
            "Audio devices in use: input {} output {}",
            device_or_default(settings.input_device),
            device_or_default(settings.output_device)
        ),
        UiUpdate::AudioTest { .. } => return None,
        UiUpdate::SipSettings(settings) => format!(
            "SIP account: {}@{} proxy {} password {}",
            settings.username,
            settings.domain,
            if settings.proxy.is_empty() {
                "(none)"
            } else {
                settings.proxy.as_str()
            },
            settings.password
        ),
        UiUpdate::Contacts(contacts) if contacts.is_empty() => "No contacts".to_string(),
        UiUpdate::Contacts(contacts) => contacts
            .iter()
            .map(|contact| {
                format!(
                    "{} {} {}{}",
                    contact.id.as_deref().unwrap_or("-"),
                    contact.name,
                    contact.number,
                    contact
                        .email
                        .as_deref()
                        .map(|email| format!(" <{email}>"))
                        .unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        UiUpdate::CallHistory(history) if history.is_empty() => "No call history".to_string(),
        UiUpdate::CallHistory(history) => history
            .iter()
            .map(|entry| {
                format!(
                    "{} {:?} {} {}",
                    entry.timestamp,
                    entry.kind,
                    entry.number,
                    call_core::session::format_duration(entry.duration)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        UiUpdate::MuteState { .. } | UiUpdate::HoldState { .. } => return None,
        // Already shown as an "Error:" status line.
        UiUpdate::BackendError { .. } => return None,
    };

    Some(line)
}

/// Multi-line summary for the `status` command.
pub fn render_snapshot(snapshot: &SessionSnapshot, duration: Option<&str>) -> String {
    let mut lines = vec![format!(
        "Screen: {} | Backend: {} | SIP: {}",
        screen_name(snapshot.screen),
        if snapshot.backend_running {
            "running"
        } else {
            "stopped"
        },
        if snapshot.registered {
            "registered"
        } else {
            "not registered"
        }
    )];

    if snapshot.calls.is_empty() {
        lines.push("No active calls".to_string());
    }

    for call in &snapshot.calls {
        let marker = if snapshot.active_call_id.as_deref() == Some(call.id.as_str()) {
            ">"
        } else {
            " "
        };
        lines.push(format!("{marker} {}", describe_call(call)));
    }

    if let Some(group) = &snapshot.conference {
        lines.push(format!(
            "Conference {} ({} members)",
            group.display_name(),
            group.len()
        ));
    }

    if let Some(duration) = duration {
        lines.push(format!("Duration: {duration}"));
    }

    lines.join("\n")
}

fn describe_call(call: &Call) -> String {
    let mut flags = Vec::new();
    if call.muted {
        flags.push("muted");
    }
    if call.on_hold {
        flags.push("on hold");
    }

    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    format!(
        "{} {} {}{flags}",
        call.id,
        display_number(&call.number),
        capitalize(call.state.as_str())
    )
}

fn display_number(number: &str) -> &str {
    if number.is_empty() {
        "(Unknown)"
    } else {
        number
    }
}

fn device_or_default(device: Option<i64>) -> String {
    device.map_or_else(|| "default".to_string(), |id| id.to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn screen_name(screen: Screen) -> &'static str {
    match screen {
        Screen::Dialer => "Dialer",
        Screen::Call => "Call",
        Screen::IncomingCall => "Incoming Call",
    }
}

/// Latest status message, visible for a limited time.
#[derive(Debug)]
pub struct StatusLine {
    ttl: Duration,
    current: Option<(String, Instant)>,
}

impl StatusLine {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.current = Some((message.into(), Instant::now()));
    }

    /// The message, unless it has expired.
    pub fn current(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|(_, shown_at)| shown_at.elapsed() < self.ttl)
            .map(|(message, _)| message.as_str())
    }
}

/// Console-side view state fed by every update.
#[derive(Debug)]
pub struct ConsoleView {
    status: StatusLine,
    duration: Option<String>,
}

impl ConsoleView {
    pub fn new(status_ttl: Duration) -> Self {
        Self {
            status: StatusLine::new(status_ttl),
            duration: None,
        }
    }

    /// Record `update` and return the line to print, if any.
    pub fn apply(&mut self, update: &UiUpdate) -> Option<String> {
        match update {
            UiUpdate::Status(message) => self.status.set(message.clone()),
            UiUpdate::Duration { text, .. } => self.duration = Some(text.clone()),
            UiUpdate::SessionReset => self.duration = None,
            _ => {}
        }

        render(update)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.current()
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }
}
