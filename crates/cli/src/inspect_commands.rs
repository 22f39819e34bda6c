use std::path::Path;

use {
    anyhow::{Context, Result, bail},
    picker_config::PickerConfig,
    picker_inspector::{ExtractLimits, extract_details},
    picker_page::load_fixture,
    tracing::debug,
};

/// Print the details of one element as JSON, or `null` when nothing matches.
pub fn inspect(
    config: &PickerConfig,
    page: &Path,
    id: Option<&str>,
    at: Option<(f64, f64)>,
) -> Result<()> {
    let doc = load_fixture(page)
        .with_context(|| format!("failed to load page {}", page.display()))?;

    let node = match (id, at) {
        (Some(id), _) => doc.get_element_by_id(id),
        (None, Some((x, y))) => doc.hit_test(x, y),
        (None, None) => bail!("either --id or --at is required"),
    };
    debug!(?node, "resolved inspect target");

    let details = extract_details(&doc, node, &ExtractLimits::from(&config.inspector));
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
