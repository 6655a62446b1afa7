use std::pin::Pin;
use std::sync::Mutex;

use futures_lite::Stream;

use crate::map;
use crate::page::{Event, Page};

const HELP: &str = "\
Type a delivery address; suggestions appear from 4 characters.
  :pick N            use suggestion N
  :item TEXT         item needed (first-aid kit, test kit, prescription)
  :urgency LEVEL     normal or priority
  :submit            request a drone
  :clear             empty the address field
  :quit              leave";

/// What was last printed, so only changes are shown.
#[derive(Default, PartialEq)]
struct Shown {
    address: String,
    loading: bool,
    suggestions: Vec<String>,
    map: String,
    requested: Option<String>,
}

/// Line-oriented console front end on stdin/stdout.
#[derive(Default)]
pub struct Frontend {
    shown: Mutex<Shown>,
}

/// One parsed line of operator input.
pub enum Line {
    Event(Event),
    Help,
    Quit,
    Invalid(String),
}

/// Parse a line. Plain text is the new value of the address field.
#[must_use]
pub fn parse(line: &str) -> Option<Line> {
    if line.trim().is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Some(Line::Event(Event::Input(line.to_owned())));
    };
    let (name, arg) = command
        .split_once(' ')
        .map_or((command, ""), |(name, arg)| (name, arg.trim()));
    let line = match name {
        "pick" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Line::Event(Event::Select(n - 1)),
            _ => Line::Invalid(format!("not a suggestion number: \"{arg}\"")),
        },
        "item" => Line::Event(Event::Item(arg.to_owned())),
        "urgency" => match arg.parse() {
            Ok(urgency) => Line::Event(Event::Urgency(urgency)),
            Err(e) => Line::Invalid(e),
        },
        "submit" => Line::Event(Event::Submit),
        "clear" => Line::Event(Event::Input(String::new())),
        "help" => Line::Help,
        "quit" | "q" => Line::Quit,
        other => Line::Invalid(format!("unknown command :{other}, try :help")),
    };
    Some(line)
}

impl crate::frontend::Frontend for Frontend {
    fn inputs(&self) -> Pin<Box<dyn Stream<Item = Event> + Send + '_>> {
        use futures_lite::io::AsyncBufReadExt;
        use futures_lite::StreamExt;

        println!("{HELP}");
        let stdin = blocking::Unblock::new(std::io::stdin());
        let reader = futures_lite::io::BufReader::new(stdin);
        Box::pin(
            reader
                .lines()
                .filter_map(|line| parse(&line.ok()?))
                .take_while(|line| !matches!(line, Line::Quit))
                .filter_map(|line| match line {
                    Line::Event(event) => Some(event),
                    Line::Help => {
                        println!("{HELP}");
                        None
                    }
                    Line::Invalid(msg) => {
                        println!("? {msg}");
                        None
                    }
                    Line::Quit => None,
                }),
        )
    }

    fn render(&self, page: &Page) {
        let next = Shown {
            address: page.address().value().to_owned(),
            loading: page.address().is_loading(),
            suggestions: page
                .address()
                .suggestions()
                .iter()
                .map(|s| s.label.clone())
                .collect(),
            map: map::summary(&page.map_view()),
            requested: page.requested().map(|order| {
                format!(
                    "request {} {}: {} to \"{}\", {}",
                    order.id,
                    order.status(),
                    order.items.join(", "),
                    page.address().value(),
                    page.urgency()
                )
            }),
        };

        let mut previous = self.shown.lock().expect("poisoned");
        if previous.map != next.map {
            println!("[map] {}", next.map);
        }
        if previous.address != next.address {
            println!("[address] {}", next.address);
        }
        if next.loading && !previous.loading {
            println!("  Searching\u{2026}");
        } else if !next.loading && previous.suggestions != next.suggestions {
            for (i, label) in next.suggestions.iter().enumerate() {
                println!("  {}. {label}", i + 1);
            }
        }
        if previous.requested != next.requested {
            if let Some(requested) = &next.requested {
                println!("[drone] {requested}");
            }
        }
        *previous = next;
        drop(previous);
    }
}
