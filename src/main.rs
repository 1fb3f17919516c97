use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use calloop::EventLoop;
use popup_menu::{
    input::keycodes, CalloopScheduler, Config, Document, DocumentListeners, ElementId,
    MenuDocumentBuilder, MenuEvent, MenuItem, Orientation, PopupHost, PopupMenu, PopupSignal,
    Position,
};

/// Host that logs placements and collects close requests
#[derive(Default)]
struct DemoHost {
    listeners: DocumentListeners,
    cancel_requests: Vec<String>,
}

impl PopupHost for DemoHost {
    fn position_at_widget(
        &mut self,
        document: &mut Document,
        target: ElementId,
        reference: ElementId,
        orientation: Orientation,
        offset: f32,
    ) {
        let label = document
            .children(reference)
            .first()
            .and_then(|&label| document.text(label))
            .unwrap_or("?")
            .to_string();
        match document.style_mut(target) {
            Ok(style) => {
                style.position = Some(Position::Absolute);
                style.top = Some(offset);
            }
            Err(err) => tracing::warn!("cannot place {target}: {err}"),
        }
        tracing::info!(
            "placing {} next to {label} ({:?}, offset {})",
            document.dom_id(target).unwrap_or("?"),
            orientation,
            offset
        );
    }

    fn emit(&mut self, popup_id: &str, signal: PopupSignal) {
        tracing::info!("{popup_id} emitted {signal:?}");
        self.cancel_requests.push(popup_id.to_string());
    }

    fn subscribe_document_listeners(&mut self, popup_id: &str) {
        self.listeners.subscribe(popup_id);
    }

    fn unsubscribe_document_listeners(&mut self, popup_id: &str) {
        self.listeners.unsubscribe(popup_id);
    }
}

struct DemoState {
    menu: PopupMenu<DemoHost, CalloopScheduler<DemoState>>,
}

static USAGE: &str = "Usage: popup-menu-demo [AUTO_HIDE_DELAY_MS]";

fn main() -> anyhow::Result<()> {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .compact()
            .init();
    }

    let (auto_hide_delay, active_class) = Config::with(|config| {
        (config.auto_hide_delay, config.active_class.clone())
    });
    let arg = ::std::env::args().nth(1);
    let auto_hide_delay = match arg.as_ref().map(|s| &s[..]) {
        Some("-h") | Some("--help") => {
            println!("{USAGE}");
            return Ok(());
        }
        Some(delay) => delay
            .parse()
            .with_context(|| format!("invalid delay {delay:?}\n{USAGE}"))?,
        None => auto_hide_delay,
    };
    // A demo that never closes on its own would just sit there
    let auto_hide_delay = if auto_hide_delay < 0 { 300 } else { auto_hide_delay };

    let items = vec![
        MenuItem::action("A"),
        MenuItem::submenu("B", vec![MenuItem::action("B1"), MenuItem::action("B2")]),
        MenuItem::action("C"),
    ];
    let (document, handles) = MenuDocumentBuilder::new("demo-popup")
        .with_padding_top(4.0)
        .build(&items)
        .context("failed to build the menu document")?;

    let mut event_loop: EventLoop<'static, DemoState> =
        EventLoop::try_new().context("failed to create the event loop")?;
    let scheduler = CalloopScheduler::new(event_loop.handle(), |state: &mut DemoState, token| {
        state.menu.on_timer(token)
    });
    let menu = PopupMenu::new(
        document,
        handles.root,
        DemoHost::default(),
        scheduler,
        auto_hide_delay,
    )?
    .with_active_class(active_class);
    let mut state = DemoState { menu };

    let item = |label: &str| handles.item(label).with_context(|| format!("no item {label}"));
    let b = item("B")?;
    let b1 = item("B1")?;
    let b_menu = handles.submenu("B").context("no submenu under B")?;

    state.menu.popup_at(handles.container);
    event_loop.dispatch(Some(Duration::ZERO), &mut state)?;

    let script = [
        MenuEvent::PointerEnter { menu: handles.root },
        MenuEvent::PointerMove { target: b },
        MenuEvent::PointerLeave { menu: handles.root },
        MenuEvent::PointerEnter { menu: b_menu },
        MenuEvent::PointerMove { target: b1 },
        MenuEvent::DocumentKey {
            keycode: keycodes::ENTER,
        },
        MenuEvent::PointerLeave { menu: b_menu },
    ];
    for event in script {
        tracing::info!("-> {event:?}");
        state.menu.handle_event(event);
        event_loop.dispatch(Some(Duration::ZERO), &mut state)?;
    }
    tracing::info!(
        "active chain: B={} B1={}",
        state.menu.is_active(b),
        state.menu.is_active(b1)
    );

    let deadline =
        Instant::now() + Duration::from_millis(auto_hide_delay as u64) + Duration::from_secs(1);
    while state.menu.host().cancel_requests.is_empty() {
        if Instant::now() > deadline {
            bail!("popup never asked to close");
        }
        event_loop.dispatch(Some(Duration::from_millis(10)), &mut state)?;
    }

    state.menu.set_hidden(true);
    tracing::info!(
        "popup closed after {} cancel request(s)",
        state.menu.host().cancel_requests.len()
    );
    Ok(())
}
