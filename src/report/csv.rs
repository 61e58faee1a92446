use super::Export;

const HEADER: &[&str] = &[
    "Institution",
    "First Name",
    "First Last Name",
    "Telephone Number",
    "Country",
    "State",
    "Email",
    "Age",
    "Source Campaign",
    "Program of Interest",
    "Campus",
    "Level of Study",
    "API Lead ID",
];

pub fn render(export: &Export) -> anyhow::Result<String> {
    let mut out = String::new();
    write_row(&mut out, HEADER.iter().copied());

    for row in &export.rows {
        write_row(
            &mut out,
            [
                row.institution.as_str(),
                row.first_name.as_str(),
                row.last_name.as_str(),
                row.phone.as_str(),
                row.country.as_str(),
                row.state.as_str(),
                row.email.as_str(),
                row.age.as_str(),
                row.campaign.as_str(),
                row.program.as_str(),
                row.campus.as_str(),
                row.study_level.as_str(),
                row.remote_id.as_str(),
            ]
            .into_iter(),
        );
    }

    Ok(out)
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}
