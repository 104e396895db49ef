//! Scene playback against the headless host

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tether_widgets::prelude::*;
use tracing::{debug, info, warn};

use crate::scene::{EventKind, Scene, Step, SubscriptionSpec};

type FiredLog = Rc<RefCell<Vec<String>>>;

/// Outcome of one playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Messages of the callbacks that fired, in firing order
    pub fired: Vec<String>,
    /// Widgets still live when the script ended
    pub live_widgets: usize,
    /// Native windows released by the host
    pub destroyed_windows: usize,
    /// Exit code requested by a closing main window
    pub quit_code: Option<i32>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fired callbacks:")?;
        for (index, message) in self.fired.iter().enumerate() {
            writeln!(f, "  {:>2}. {message}", index + 1)?;
        }
        writeln!(f, "Live widgets:      {}", self.live_widgets)?;
        writeln!(f, "Destroyed windows: {}", self.destroyed_windows)?;
        match self.quit_code {
            Some(code) => write!(f, "Quit requested:    {code}"),
            None => write!(f, "Quit requested:    no"),
        }
    }
}

/// Build the scene's widget tree, wire its subscriptions and replay its steps
pub fn run(scene: &Scene) -> Result<Report> {
    let host = Rc::new(HeadlessHost::new());
    let ui = Ui::new(host.clone());
    info!(scene = %scene.scene.name, host = host.name(), "Building scene");

    let mut widgets: IndexMap<String, Widget> = IndexMap::new();
    for spec in &scene.widgets {
        let widget = match &spec.parent {
            Some(parent) => {
                let parent = lookup(&widgets, parent)?;
                parent.create_child(spec.kind(), spec.config())
            }
            None => ui.create(spec.kind(), spec.config()),
        }
        .with_context(|| format!("Failed to create widget `{}`", spec.name))?;
        debug!(name = %spec.name, widget = ?widget, "Created widget");
        widgets.insert(spec.name.clone(), widget);
    }

    let fired: FiredLog = Rc::new(RefCell::new(Vec::new()));
    for sub in &scene.subscriptions {
        wire(&widgets, sub, &fired)?;
    }

    for step in &scene.steps {
        play(&ui, &widgets, step)?;
    }

    let live_widgets = widgets.values().filter(|w| w.is_live()).count();
    let report = Report {
        fired: fired.borrow().clone(),
        live_widgets,
        destroyed_windows: host.destroyed().len(),
        quit_code: host.quit_code(),
    };
    info!(
        fired = report.fired.len(),
        live = report.live_widgets,
        "Scene finished"
    );
    Ok(report)
}

fn lookup<'a>(widgets: &'a IndexMap<String, Widget>, name: &str) -> Result<&'a Widget> {
    widgets
        .get(name)
        .with_context(|| format!("Unknown widget `{name}`"))
}

fn wire(widgets: &IndexMap<String, Widget>, sub: &SubscriptionSpec, fired: &FiredLog) -> Result<()> {
    let widget = lookup(widgets, &sub.widget)?;
    let owner = sub
        .owner
        .as_deref()
        .map(|name| lookup(widgets, name))
        .transpose()?;

    let id = match sub.event {
        EventKind::Click => subscribe(widget.on_click(), owner, {
            let fired = fired.clone();
            let message = sub.message.clone();
            move |_: &()| record(&fired, message.clone())
        }),
        EventKind::Close => subscribe(widget.on_close(), owner, {
            let fired = fired.clone();
            let message = sub.message.clone();
            move |_: &()| record(&fired, message.clone())
        }),
        EventKind::Resize => subscribe(widget.on_resize(), owner, {
            let fired = fired.clone();
            let message = sub.message.clone();
            move |size: &Size| record(&fired, format!("{message} ({}x{})", size.width, size.height))
        }),
    };
    debug!(
        event = ?sub.event,
        widget = %sub.widget,
        owner = ?sub.owner,
        id = %id,
        "Wired subscription"
    );
    Ok(())
}

fn subscribe<A, F>(channel: &EventHandler<A>, owner: Option<&Widget>, callback: F) -> EventId
where
    A: ?Sized + 'static,
    F: Fn(&A) + 'static,
{
    match owner {
        Some(owner) => channel.add_owned_event(callback, owner),
        None => channel.add_event(callback),
    }
}

fn record(fired: &FiredLog, message: String) {
    info!(%message, "Callback fired");
    fired.borrow_mut().push(message);
}

fn play(ui: &Ui, widgets: &IndexMap<String, Widget>, step: &Step) -> Result<()> {
    let target = lookup(widgets, step.target())?;
    if !target.is_live() {
        warn!(widget = step.target(), "Target already destroyed, skipping step");
        return Ok(());
    }

    let (handle, message) = match step {
        Step::Destroy { target: name } => {
            info!(widget = %name, "Destroying");
            target.destroy();
            return Ok(());
        }
        Step::Click { target: name } => {
            let (Some(parent), Some(child)) = (target.parent(), target.child_id()) else {
                warn!(widget = %name, "Button has no parent, skipping click");
                return Ok(());
            };
            (parent.handle(), NativeMessage::Command { child })
        }
        Step::Close { .. } => (target.handle(), NativeMessage::Close),
        Step::Resize { width, height, .. } => (
            target.handle(),
            NativeMessage::Resize(Size::new(*width, *height)),
        ),
    };

    if !ui.dispatch(handle, &message) {
        debug!(widget = step.target(), ?message, "Message left to default processing");
    }
    Ok(())
}
