use tracing::info;

use crate::error::InvmapError;
use crate::llm::GenerativeModel;

/// Starting JSON extraction structure, shown to the user before any
/// regeneration.
pub const DEFAULT_SUB_PROMPT: &str = r#"{
  "S.No": i,
  "Memo #": "",
  "Vendor Name": "<payable_to>",
  "Service Address": "<sites: [{address}]>",
  "Inv #": "<invoice_number>",
  "Inv Date": "<invoice_date>",
  "Due Date": "<due_date>",
  "Amt": "<invoice_total_amount>"
}
Return only valid JSON.
Ensure "S.No" starts at 1 and increments sequentially."#;

/// Prompt asking the model to adapt the sub prompt to a template's columns.
pub fn regeneration_prompt(columns: &[String], current_sub_prompt: &str) -> String {
    format!(
        r#"You are a professional invoice data extraction assistant.
Analyze the invoice and the following Excel template columns:
{columns}

Generate a JSON extraction structure suitable for this template.
Ensure "S.No" starts at 1 and increments sequentially.

Example:
{current_sub_prompt}

Return only valid JSON, no markdown or explanations."#,
        columns = quoted_list(columns),
    )
}

/// Prompt sent with the page images.
pub fn extraction_prompt(sub_prompt: &str) -> String {
    format!(
        r#"Use this JSON structure to extract all data from the invoice images and map it to the Excel template fields.

{sub_prompt}

Ensure:
- "S.No" starts from 1 and increments by 1.
- Return only valid JSON, no markdown or explanations."#
    )
}

/// Ask the model for a sub prompt tailored to `columns`.
pub fn regenerate_sub_prompt(
    model: &dyn GenerativeModel,
    columns: &[String],
    current_sub_prompt: &str,
) -> Result<String, InvmapError> {
    let prompt = regeneration_prompt(columns, current_sub_prompt);
    let reply = model.generate(&prompt, &[])?;
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(InvmapError::Model("empty sub prompt returned".into()));
    }
    info!(model = model.model_name(), chars = reply.len(), "Sub prompt regenerated");
    Ok(reply.to_string())
}

/// `['S.No', 'Memo #']`
fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|s| format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_list() {
        let cols = vec!["S.No".to_string(), "Vendor's Name".to_string()];
        assert_eq!(quoted_list(&cols), r"['S.No', 'Vendor\'s Name']");
        assert_eq!(quoted_list(&[]), "[]");
    }

    #[test]
    fn test_regeneration_prompt_mentions_columns_and_example() {
        let prompt = regeneration_prompt(&["Inv #".to_string()], DEFAULT_SUB_PROMPT);
        assert!(prompt.contains("['Inv #']"));
        assert!(prompt.contains("\"Vendor Name\": \"<payable_to>\""));
    }

    #[test]
    fn test_extraction_prompt_embeds_sub_prompt() {
        let prompt = extraction_prompt("{\"Amt\": \"<total>\"}");
        assert!(prompt.contains("{\"Amt\": \"<total>\"}"));
        assert!(prompt.starts_with("Use this JSON structure"));
    }
}
