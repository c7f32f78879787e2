use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::NavConfig;
use crate::dom::{self, Document};
use crate::logging;
use crate::nav::{PageController, ReconcileMode, TreeContract};
use crate::screens::browse::BrowseScreen;
use crate::ui::App;

pub fn load_page(path: &Path) -> Result<Document> {
    let markup =
        fs::read_to_string(path).with_context(|| format!("failed to read page {}", path.display()))?;
    dom::parse(&markup).with_context(|| format!("failed to load page {}", path.display()))
}

fn page_controller(config: &NavConfig, page: &Path) -> Result<PageController> {
    let contract = TreeContract::from_config(config)?;
    Ok(PageController::load(load_page(page)?, contract))
}

pub fn reconcile(
    config: &NavConfig,
    page: &Path,
    location: &str,
    mode: Option<ReconcileMode>,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(mode) = mode {
        config.mode = mode;
    }

    let mut controller = page_controller(&config, page)?;
    let report = controller.on_load(location);
    if !report.changed() {
        log::info!("{location} left the tree unchanged");
    }

    let markup = dom::serialize(&controller.into_document());
    match output {
        Some(path) => {
            fs::write(path, markup).with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => writeln!(out, "{markup}")?,
    }
    Ok(())
}

pub fn keys(config: &NavConfig, page: &Path, out: &mut impl Write) -> Result<()> {
    let controller = page_controller(config, page)?;
    let doc = controller.document();
    for (key, node) in controller.tree_map().sorted() {
        let container = controller.handlers().container_for(node);
        let label = crate::node_utils::NodeUtils::toggle_label(doc, node, container);
        writeln!(out, "/{key}\t{node}\t{label}")?;
    }
    Ok(())
}

pub fn browse(config: &NavConfig, page: &Path, location: Option<&str>) -> Result<()> {
    let controller = page_controller(config, page)?;
    let page_name = page
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| page.display().to_string());

    let mut screen = BrowseScreen::new(controller, page_name);
    if let Some(location) = location {
        screen.apply_initial_location(location);
    }

    logging::switch_to_tui_logging();
    App::new(screen).run()
}
