use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::contests::contest_type::{Contest, FeedTime};
use crate::countdown::formatter::{DisplayCategory, TimerFormat};
use crate::countdown::ticker::RenderSink;

/// Rewrites a single terminal line with the countdown text.
pub struct ConsoleSink {
    format: TimerFormat,
    last_category: Mutex<Option<DisplayCategory>>,
    write_failed: AtomicBool,
}

impl ConsoleSink {
    pub fn new(format: TimerFormat) -> Self {
        Self {
            format,
            last_category: Mutex::new(None),
            write_failed: AtomicBool::new(false),
        }
    }
}

impl RenderSink for ConsoleSink {
    fn render(&self, category: &DisplayCategory) {
        if let Ok(mut last) = self.last_category.lock() {
            if last.map(|c| std::mem::discriminant(&c)) != Some(std::mem::discriminant(category)) {
                log::debug!("countdown now shows {:?}", category);
            }
            *last = Some(*category);
        }
        let text = self.format.text(category);
        if let Err(e) = rewrite_line(&mut io::stdout().lock(), &text) {
            // reported once; the next tick simply tries again
            if !self.write_failed.swap(true, Ordering::Relaxed) {
                log::debug!("countdown line could not be written: {}", e);
            }
        }
    }
}

fn rewrite_line(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "\r\x1b[2K{}", text)?;
    out.flush()
}

pub fn contest_block(no: usize, contest: &Contest) -> String {
    format!(
        "{} {}\n  Platform:   {}\n  Start Time: {}\n  End Time:   {}\n  Duration:   {}\n  \
         Link:       {}",
        ordinal_suffix(no),
        contest.name,
        contest.platform,
        show_time(contest.start_time.as_ref()),
        show_time(contest.end_time.as_ref()),
        contest.duration_text(),
        contest.url,
    )
}

fn show_time(time: Option<&FeedTime>) -> String {
    time.map_or_else(|| "-".to_string(), FeedTime::to_string)
}

pub fn contest_list(title: &str, contests: &[Contest]) -> String {
    let mut lines = vec![format!("{} ({})", title, contests.len())];
    if contests.is_empty() {
        lines.push("(empty)".to_string());
    }
    for (i, contest) in contests.iter().enumerate() {
        lines.push(contest_block(i + 1, contest));
    }
    lines.join("\n")
}

fn ordinal_suffix(n: usize) -> String {
    let suffix = match n % 10 {
        1 if n % 100 != 11 => "st",
        2 if n % 100 != 12 => "nd",
        3 if n % 100 != 13 => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
