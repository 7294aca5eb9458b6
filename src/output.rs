// output formatting - readable chat turns or raw json

use crate::core::{ChatTurn, Classification};
use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Drops `**bold**` markers the model likes to add.
pub fn clean_response(text: &str) -> String {
    BOLD.replace_all(text, "$1").into_owned()
}

pub struct Output;

impl Output {
    // chat style for humans
    pub fn pretty(turn: &ChatTurn) {
        print!("{}", Self::render(turn));
    }

    /// The text [`Output::pretty`] prints, time shown in the local zone.
    pub fn render(turn: &ChatTurn) -> String {
        let mut out = format!("you: {}\n\n", turn.message);

        if turn.is_red_flag {
            out.push_str("!! Health Alert\n");
        }

        out.push_str(&format!("assistant: {}\n", clean_response(&turn.response)));
        out.push_str(&format!(
            "{}\n",
            turn.timestamp.with_timezone(&Local).format("%H:%M")
        ));
        out
    }

    pub fn classification(result: &Classification) {
        if !result.is_emergency {
            println!("no red flags");
            return;
        }

        println!("red flag: emergency");
        if result.matches.is_empty() {
            println!("matched: urgency terms only");
        } else {
            println!("matched: {}", result.matches.join(", "));
        }
    }

    // raw json for scripts
    pub fn raw<T: serde::Serialize>(value: &T) {
        println!("{}", serde_json::to_string(value).unwrap_or_default());
    }
}
