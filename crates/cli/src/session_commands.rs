use std::{path::Path, sync::Arc};

use {
    anyhow::{Context, Result},
    picker_bus::MessageBus,
    picker_config::PickerConfig,
    picker_coordinator::Coordinator,
    picker_inspector::{PageRuntime, UserInput},
    picker_page::load_fixture,
    picker_popup::{ClickOutcome, FixedTab, PopupController},
    picker_protocol::{TabDescriptor, TabId},
    tracing::{info, warn},
};

/// Wire a page, the coordinator and a popup over one bus, then start
/// picking, click each point and stop again.
pub async fn run_session(
    config: &PickerConfig,
    page: &Path,
    tab: TabId,
    clicks: &[(f64, f64)],
) -> Result<()> {
    let doc = load_fixture(page)
        .with_context(|| format!("failed to load page {}", page.display()))?;
    let title = doc.title().to_string();

    let bus = MessageBus::new(&config.bus);
    let coordinator = Arc::new(Coordinator::with_bus(&bus, &config.coordinator));
    let background = Arc::clone(&coordinator).spawn(&bus).await;
    let page = PageRuntime::new(tab, doc, &config.inspector, bus.clone())?
        .spawn()
        .await;

    let mut descriptor = TabDescriptor::new(tab);
    descriptor.title = Some(title).filter(|t| !t.is_empty());
    let popup = PopupController::with_bus(&bus, Arc::new(FixedTab::new(descriptor)));
    let mut events = bus.subscribe_popup();

    let started = popup.on_start_clicked().await;
    println!("start: {}", describe(&started));
    let view = popup.view().await;
    if !view.active {
        println!("{}", view.panel);
        page.close().await?;
        background.abort();
        return Ok(());
    }

    for &(x, y) in clicks {
        let outcome = page.input(UserInput::Click { x, y }).await?;
        let picked = outcome
            .selection
            .as_ref()
            .and_then(|s| s.details.as_ref())
            .map(|d| match &d.id {
                Some(id) => format!("<{}#{id}>", d.tag_name),
                None => format!("<{}>", d.tag_name),
            })
            .unwrap_or_else(|| "nothing".into());
        println!("click ({x}, {y}): {picked}");

        if outcome.reported {
            match events.recv().await {
                Ok(event) => popup.handle_event(event).await,
                Err(e) => warn!(error = %e, "popup missed element info"),
            }
            println!("{}", popup.view().await.panel);
        }
    }

    let stopped = popup.on_stop_clicked().await;
    println!("stop: {}", describe(&stopped));
    println!("{}", popup.view().await.panel);

    let doc = page.close().await?;
    background.abort();
    info!(tab, title = doc.title(), "session finished");
    Ok(())
}

fn describe(outcome: &ClickOutcome) -> String {
    match outcome {
        ClickOutcome::Ignored => "ignored".into(),
        ClickOutcome::NoActiveTab => "no active tab".into(),
        ClickOutcome::Replied(reply) => reply.to_string(),
        ClickOutcome::TransportFailed(error) => format!("transport failed: {error}"),
    }
}
