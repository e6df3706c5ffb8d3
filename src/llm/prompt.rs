// Prompt templates for the slate Q&A panel.
//
// Serializes scored results as fixed-width text and wraps the user's
// free-text question around it. The numbers are pre-computed so the model
// focuses on interpretation rather than arithmetic.

use crate::scoring::engine::ScoredTable;
use crate::slate::SlateRow;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Static system prompt for all slate Q&A calls.
pub fn system_prompt() -> String {
    "You are a baseball analytics assistant answering questions about a table of \
     projected home-run probabilities.\n\
     \n\
     The probabilities come from a fixed-weight heuristic over batter power, recent \
     form, pitcher home-run susceptibility, pitch mix, and weather. They are \
     projections, not guarantees.\n\
     \n\
     Answer concisely using ONLY the numbers in the provided table — do not invent \
     players, probabilities, or salaries that are not shown."
        .to_string()
}

// ---------------------------------------------------------------------------
// Fixed-width table serialization
// ---------------------------------------------------------------------------

/// Render a scored lineup as a fixed-width text table.
pub fn format_scored_table(table: &ScoredTable) -> String {
    let mut out = String::with_capacity(64 + table.len() * 40);
    out.push_str(&format!("{:<4} {:<24} {:>8}\n", "#", "PLAYER", "HR PROB"));

    for (i, row) in table.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<24} {:>7.1}%\n",
            i + 1,
            row.entry.player,
            row.probability * 100.0
        ));
    }

    out
}

/// Render simulated slate rows as a fixed-width text table.
pub fn format_slate(rows: &[SlateRow]) -> String {
    let mut out = String::with_capacity(64 + rows.len() * 56);
    out.push_str(&format!(
        "{:<6} {:<6} {:<24} {:>8}\n",
        "TEAM", "OPP", "PLAYER", "HR PROB"
    ));

    for row in rows {
        out.push_str(&format!(
            "{:<6} {:<6} {:<24} {:>7.1}%\n",
            row.team,
            row.opponent,
            row.player,
            row.probability * 100.0
        ));
    }

    out
}

// ---------------------------------------------------------------------------
// Question prompt
// ---------------------------------------------------------------------------

/// Combine the user's question with the serialized results table.
pub fn build_question_prompt(question: &str, context: &str) -> String {
    format!(
        "Projected home-run table:\n\
         \n\
         {context}\n\
         Question: {question}"
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
