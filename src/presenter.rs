use console::{style, Term};
use tabled::settings::merge::Merge;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Style};
use tabled::{Table, Tabled};

const FALLBACK_WIDTH: usize = 80;

#[derive(Tabled)]
pub struct ServiceRow {
    #[tabled(rename = "ServiceType")]
    pub kind: String,
    #[tabled(rename = "ServiceName")]
    pub name: String,
}

#[derive(Tabled)]
pub struct BranchRow {
    #[tabled(rename = "ServiceName")]
    pub service: String,
    #[tabled(rename = "Branches")]
    pub branch: String,
}

fn terminal_width() -> usize {
    let term = Term::stdout();
    if term.is_term() {
        term.size().1 as usize
    } else {
        FALLBACK_WIDTH
    }
}

/// Fit `line` to exactly `width` characters, padding with `fill` or truncating with `...`.
fn fit(line: &str, width: usize, fill: char) -> String {
    let length = line.chars().count();
    if length <= width {
        let mut fitted = line.to_string();
        fitted.extend(std::iter::repeat(fill).take(width - length));
        fitted
    } else {
        let keep = width.saturating_sub(3);
        let mut fitted: String = line.chars().take(keep).collect();
        fitted.push_str(&"..."[..width.min(3)]);
        fitted
    }
}

fn framed(text: &str, width: usize) -> String {
    let rule = "=".repeat(width);
    format!("{rule}\n{}\n{rule}", fit(text, width, '*'))
}

pub fn step_banner(step: usize, text: &str, width: usize) -> String {
    framed(&format!("\tStep{step}: [ {text} ] "), width)
}

pub fn finished_banner(text: &str, width: usize) -> String {
    framed(&format!("\t{text}  "), width)
}

pub fn step(step: usize, text: &str) {
    println!("{}", style(step_banner(step, text, terminal_width())).green());
}

pub fn finished(text: &str) {
    println!("{}", style(finished_banner(text, terminal_width())).green());
}

/// Render rows with green headers, merging repeated cells in a column.
pub fn table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Merge::vertical())
        .modify(Rows::first(), Color::FG_GREEN | Color::BOLD);
    table.to_string()
}
