use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::services::markdown::extract::extract_days;
use crate::services::markdown::ops::{
    append_day, append_note, clear_day, nights_from_markdown, rebuild_sequential, replace_day_raw,
    strip_day_header,
};

/// A structural edit on the itinerary document. Every variant is a pure
/// transform; a target that does not exist leaves the document unchanged.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditOp {
    /// Append a fresh template day numbered after the current maximum.
    AppendDay,
    /// Reset a day to the empty template, keeping its number and title.
    #[serde(rename_all = "camelCase")]
    RemoveDay { day_number: u32 },
    /// Renumber days 1..N, optionally dropping one day entirely.
    #[serde(rename_all = "camelCase")]
    RebuildSequential {
        #[serde(default)]
        remove_day_number: Option<u32>,
    },
    /// Append a Notes subsection to a day.
    #[serde(rename_all = "camelCase")]
    AppendNote { day_number: u32, note: String },
    /// Replace a day's body with free text; the header line stays fixed.
    #[serde(rename_all = "camelCase")]
    EditDay { day_number: u32, body: String },
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub markdown: String,
    #[serde(flatten)]
    pub op: EditOp,
}

fn apply(markdown: &str, op: &EditOp) -> String {
    match op {
        EditOp::AppendDay => append_day(markdown),
        EditOp::RemoveDay { day_number } => clear_day(markdown, *day_number),
        EditOp::RebuildSequential { remove_day_number } => {
            rebuild_sequential(markdown, *remove_day_number)
        }
        EditOp::AppendNote { day_number, note } => append_note(markdown, *day_number, note),
        EditOp::EditDay { day_number, body } => {
            let Some(day) = extract_days(markdown)
                .into_iter()
                .find(|d| d.day_num == *day_number)
            else {
                return markdown.to_string();
            };
            let clean_body = strip_day_header(body);
            if clean_body.is_empty() {
                return markdown.to_string();
            }
            let block = format!("## Day {} - {}\n{}\n", day_number, day.title, clean_body);
            replace_day_raw(markdown, *day_number, &block)
        }
    }
}

/*
    POST /api/itineraries/edit

    Structural no-ops (missing day, empty note/body) return the document
    unchanged rather than failing; the client state is never corrupted.
*/
pub async fn edit(body: web::Json<EditRequest>) -> impl Responder {
    let request = body.into_inner();
    if request.markdown.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "An itinerary document is required." }));
    }

    let updated = apply(&request.markdown, &request.op);
    let nights = nights_from_markdown(&updated);
    HttpResponse::Ok().json(json!({ "markdown": updated, "nights": nights }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "## Day 1 - Arrival\n### Morning\n- **Walk**\n\n## Day 2 - Out\n### Morning\n- **Boat**\n";

    #[test]
    fn test_ops_deserialize_by_tag() {
        let request: EditRequest = serde_json::from_str(
            r#"{"markdown": "x", "op": "appendNote", "dayNumber": 2, "note": "call ahead"}"#,
        )
        .expect("parse");
        assert!(matches!(
            request.op,
            EditOp::AppendNote { day_number: 2, ref note } if note == "call ahead"
        ));

        let request: EditRequest =
            serde_json::from_str(r#"{"markdown": "x", "op": "appendDay"}"#).expect("parse");
        assert!(matches!(request.op, EditOp::AppendDay));
    }

    #[test]
    fn test_edit_day_keeps_header_fixed() {
        let updated = apply(
            DOC,
            &EditOp::EditDay {
                day_number: 1,
                body: "## Day 1 - Renamed\n### Morning\n- **Run** instead".to_string(),
            },
        );
        let days = extract_days(&updated);
        assert_eq!(days[0].title, "Arrival");
        assert!(days[0].raw.contains("Run"));
        assert_eq!(days[1].raw, extract_days(DOC)[1].raw);
    }

    #[test]
    fn test_edit_day_empty_body_is_noop() {
        let updated = apply(
            DOC,
            &EditOp::EditDay {
                day_number: 1,
                body: "## Day 1 - Renamed\n".to_string(),
            },
        );
        assert_eq!(updated, DOC);
    }

    #[test]
    fn test_rebuild_after_remove_scenario() {
        let three = "## Day 1 - A\n- one\n\n## Day 2 - B\n- two\n\n## Day 3 - C\n- three\n";
        let updated = apply(
            three,
            &EditOp::RebuildSequential {
                remove_day_number: Some(2),
            },
        );
        let days = extract_days(&updated);
        assert_eq!(days.len(), 2);
        assert_eq!((days[0].day_num, days[0].title.as_str()), (1, "A"));
        assert_eq!((days[1].day_num, days[1].title.as_str()), (2, "C"));
    }
}
