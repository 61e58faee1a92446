use super::Export;

pub fn render(export: &Export) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(export)?)
}
