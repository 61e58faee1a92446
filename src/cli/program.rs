use comfy_table::{Cell, Table};

use crate::db::Database;

pub fn list(db: &Database) -> anyhow::Result<()> {
    let programs = db.list_programs()?;

    if programs.is_empty() {
        println!("The program catalog is empty. Add one with `lead-courier program set`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Program", "Product ID", "Dedication ID"]);
    for p in &programs {
        table.add_row(vec![
            Cell::new(&p.name),
            Cell::new(&p.product_id),
            Cell::new(&p.dedication_id),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn set(db: &Database, name: &str, product: &str, dedication: &str) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Program name cannot be empty");
    }
    db.upsert_program(name, product.trim(), dedication.trim())?;
    println!("Program '{name}' saved ({product}/{dedication}).");
    Ok(())
}

pub fn remove(db: &Database, name: &str) -> anyhow::Result<()> {
    if db.remove_program(name)? {
        println!("Program '{name}' removed.");
    } else {
        println!("Program '{name}' is not in the catalog.");
    }
    Ok(())
}
