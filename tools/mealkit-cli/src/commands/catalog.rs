//! List catalog items.

use anyhow::Result;
use mealkit_commerce::catalog::Item;

use super::CatalogArgs;
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.config.build_catalog()?;

    let items: Vec<&Item> = match args.tag.as_deref() {
        Some(tag) => catalog.with_tag(tag).collect(),
        None => catalog.items().iter().collect(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return Ok(());
    }

    match args.tag.as_deref() {
        Some(tag) => ctx.output.header(&format!("Meals tagged '{}'", tag)),
        None => ctx.output.header("Meals"),
    }

    if items.is_empty() {
        ctx.output.warn("No meals found");
        return Ok(());
    }

    let widths = [18, 30, 10, 24];
    ctx.output.table_row(&["ID", "NAME", "PRICE", "NUTRITION"], &widths);
    for item in &items {
        let price = item.price.display();
        let nutrition = item
            .nutrition
            .map(|n| format!("{} kcal, {}g protein", n.calories, n.protein))
            .unwrap_or_default();
        ctx.output
            .table_row(&[item.id.as_str(), &item.name, &price, &nutrition], &widths);
    }

    ctx.output.info(&format!("{} meal(s)", items.len()));
    Ok(())
}
