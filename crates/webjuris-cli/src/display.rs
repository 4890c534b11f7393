//! Terminal rendering for case lists, case cards and reference tables.

use webjuris_core::courts::{self, CourtOfAppeal, FirstInstanceTribunal};
use webjuris_core::dates::display_date;
use webjuris_core::{CaseRecord, CaseStatus, ClassificationCode, StatusCounts};
use webjuris_store::NumberUse;

const TITLE_WIDTH: usize = 32;
const CLIENT_WIDTH: usize = 28;

// ── Case list ──

pub fn print_counts(counts: &StatusCounts) {
    print!("{} cases", counts.total);
    for status in CaseStatus::ALL {
        print!("  {}: {}", status.label(), counts.get(status));
    }
    println!();
    println!();
}

pub fn print_case_table(cases: &[&CaseRecord]) {
    if cases.is_empty() {
        println!("No matching cases.");
        return;
    }

    println!(
        "{:<16} {:<TITLE_WIDTH$} {:<CLIENT_WIDTH$} {:<12} {:<8} {}",
        "Number", "Title", "Client", "Status", "Priority", "Next hearing"
    );
    for case in cases {
        let hearing = case
            .next_hearing
            .as_deref()
            .map(display_date)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<TITLE_WIDTH$} {:<CLIENT_WIDTH$} {:<12} {:<8} {}",
            case.case_number,
            truncate(&case.title, TITLE_WIDTH),
            truncate(&case.client, CLIENT_WIDTH),
            case.status.label(),
            case.priority.label(),
            hearing
        );
    }
}

// ── Case card ──

/// Print one case as a vertical card grouped by section.
pub fn print_case_card(case: &CaseRecord) {
    println!("=== {} ===", case.case_number);
    println!("{}", case.title);
    println!();

    println!("Identity");
    field("id", &case.id);
    field("client", &case.client);
    field("lawyer", &case.lawyer);
    field(
        "status",
        &format!("{} [{}]", case.status.label(), case.status.tone()),
    );
    field("priority", case.priority.label());
    println!();

    if case.court.is_some() || case.court_of_appeal.is_some() || case.first_instance_tribunal.is_some()
    {
        println!("Jurisdiction");
        if let Some(court) = &case.court {
            field("court", court);
        }
        if let Some(id) = &case.court_of_appeal {
            field("court of appeal", &court_of_appeal_name(id));
        }
        if let Some(id) = &case.first_instance_tribunal {
            field("first-instance tribunal", &tribunal_name(id));
        }
        println!();
    }

    println!("Dates");
    field("opened", &display_date(&case.created_date));
    field("last update", &display_date(&case.last_update));
    if let Some(hearing) = &case.next_hearing {
        field("next hearing", &display_date(hearing));
    }
    println!();

    if let Some(decision) = &case.last_decision {
        println!("Last decision");
        field("type", &decision.decision_type);
        field("date", &display_date(&decision.date));
        field("content", &decision.content);
        println!();
    }

    if !case.description.is_empty() {
        println!("Description");
        println!("  {}", case.description);
        println!();
    }
}

fn field(name: &str, value: &str) {
    println!("  {:<26} {}", name, value);
}

// ── Reference tables ──

pub fn print_codes(codes: &[ClassificationCode]) {
    for code in codes {
        println!("  {:<6} {:<28} {}", code.code, code.label, code.arabic_label);
    }
}

pub fn print_courts(entries: &[CourtOfAppeal]) {
    for court in entries {
        println!("  {:<14} {:<36} {}", court.id, court.name, court.arabic_name);
    }
}

pub fn print_tribunals(court: &CourtOfAppeal, tribunals: &[&FirstInstanceTribunal]) {
    println!("{} ({})", court.name, court.id);
    if tribunals.is_empty() {
        println!("  no first-instance tribunals recorded");
        return;
    }
    for t in tribunals {
        println!("  {:<22} {:<40} {}", t.id, t.name, t.arabic_name);
    }
}

// ── Reserved numbers ──

pub fn print_numbers(usage: &[NumberUse<'_>]) {
    let (used, available): (Vec<_>, Vec<_>) = usage.iter().partition(|u| u.used);
    number_group("Available", &available);
    println!();
    number_group("Used", &used);
}

fn number_group(header: &str, rows: &[&NumberUse<'_>]) {
    println!("{header} ({})", rows.len());
    if rows.is_empty() {
        println!("  none");
    }
    for row in rows {
        let note = row.entry.note.as_deref().unwrap_or("");
        println!("  #{:<5} {:<20} {}", row.entry.id, row.entry.number, note);
    }
}

// ── Helpers ──

/// Shorten to `width` characters, marking the cut with `...`.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn court_of_appeal_name(id: &str) -> String {
    courts::court_of_appeal(id)
        .map(|c| c.name.to_string())
        .unwrap_or_else(|| id.to_string())
}

fn tribunal_name(id: &str) -> String {
    courts::first_instance_tribunal(id)
        .map(|t| t.name.to_string())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Divorce Martin", 32), "Divorce Martin");
        assert_eq!(truncate("Procédure d'appel éàü", 10), "Procédu...");
        assert_eq!(truncate("abcdef", 6), "abcdef");
    }

    #[test]
    fn court_names_fall_back_to_id() {
        assert_eq!(court_of_appeal_name("rabat"), "Cour d'Appel de Rabat");
        assert_eq!(court_of_appeal_name("atlantis"), "atlantis");
        assert_eq!(tribunal_name("nowhere"), "nowhere");
    }
}
