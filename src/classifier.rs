//! Line classification for rendered itinerary text
//!
//! The assistant answers travel-planning questions with loosely structured
//! plain text (day headings, time slots, cost breakdowns). The UI renders
//! each line according to the category returned here. Classification is a
//! pure function of a single line: no state, no ordering dependence between
//! lines, and no failure mode other than falling back to [`LineCategory::Plain`].

use serde::Serialize;

/// Display category for one line of assistant text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    SectionHeading,
    DayHeading,
    TimeSlot,
    CostHeading,
    CostItem,
    Blank,
    Plain,
}

/// Time-of-day labels that open a schedule slot ("Sáng: ăn phở ở ...").
/// Compared case-insensitively against the first word of the line.
const TIME_LABELS: &[&str] = &[
    "sáng",
    "trưa",
    "chiều",
    "tối",
    "morning",
    "noon",
    "afternoon",
    "evening",
    "night",
];

/// Markers that open a cost section.
const COST_HEADINGS: &[&str] = &["chi phí", "tổng chi phí", "cost"];

/// Currency markers recognized inside bullet lines. The bare letter "đ"
/// is not listed: it occurs in ordinary words ("đi", "đêm") and would
/// misclassify plain list items.
const CURRENCY_MARKERS: &[&str] = &["VND", "₫", "$", "USD"];

/// Classify one line of assistant text.
///
/// Total and deterministic: every input maps to exactly one category, and
/// the same line always maps to the same category. Leading/trailing
/// whitespace is ignored; an all-whitespace line is [`LineCategory::Blank`].
pub fn classify(line: &str) -> LineCategory {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineCategory::Blank;
    }

    if is_day_heading(trimmed) {
        return LineCategory::DayHeading;
    }
    if is_time_slot(trimmed) {
        return LineCategory::TimeSlot;
    }
    if is_cost_heading(trimmed) {
        return LineCategory::CostHeading;
    }
    if is_cost_item(trimmed) {
        return LineCategory::CostItem;
    }
    if is_section_heading(trimmed) {
        return LineCategory::SectionHeading;
    }

    LineCategory::Plain
}

/// "Ngày 1: ...", "Day 2 - ...", or a calendar-emoji prefix.
fn is_day_heading(line: &str) -> bool {
    if line.starts_with('📅') {
        return true;
    }
    for prefix in ["Ngày ", "ngày ", "Day ", "day "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}

/// A recognized time-of-day label immediately followed by a colon.
fn is_time_slot(line: &str) -> bool {
    let Some((label, _)) = line.split_once(':') else {
        return false;
    };
    let label = label.trim().to_lowercase();
    TIME_LABELS.contains(&label.as_str())
}

fn is_cost_heading(line: &str) -> bool {
    if line.starts_with('💰') {
        return true;
    }
    let lowered = line.to_lowercase();
    COST_HEADINGS
        .iter()
        .any(|heading| lowered.starts_with(heading))
}

/// A bullet line quoting an amount: "- Khách sạn: 1.200.000 VND".
fn is_cost_item(line: &str) -> bool {
    let Some(rest) = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .or_else(|| line.strip_prefix('+'))
    else {
        return false;
    };
    rest.chars().any(|c| c.is_ascii_digit())
        && CURRENCY_MARKERS.iter().any(|marker| rest.contains(marker))
}

/// "**Địa điểm nổi bật**", markdown headings, or a bare trailing colon.
fn is_section_heading(line: &str) -> bool {
    line.starts_with("**") || line.starts_with('#') || line.ends_with(':')
}
