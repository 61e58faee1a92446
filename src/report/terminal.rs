use comfy_table::{Cell, Table};

use super::Export;

pub fn render(export: &Export) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str(&format!(
        "=== Lead Export ({}) ===\n\n",
        export.generated_at
    ));

    output.push_str("--- Summary ---\n");
    output.push_str(&format!("Leads captured:   {}\n", export.summary.total));
    output.push_str(&format!("  Synced:         {}\n", export.summary.synced));
    output.push_str(&format!("  Pending:        {}\n", export.summary.pending));

    if !export.rows.is_empty() {
        output.push_str("\n--- Leads ---\n");
        let mut table = Table::new();
        table.set_header(vec![
            "Name", "Email", "Phone", "Country", "State", "Program", "Remote ID",
        ]);
        for row in &export.rows {
            table.add_row(vec![
                Cell::new(format!("{} {}", row.first_name, row.last_name)),
                Cell::new(&row.email),
                Cell::new(&row.phone),
                Cell::new(&row.country),
                Cell::new(&row.state),
                Cell::new(&row.program),
                Cell::new(if row.remote_id.is_empty() {
                    "-"
                } else {
                    row.remote_id.as_str()
                }),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    Ok(output)
}
