use crate::chatbox::ChatboxReporter;
use crate::command::{CommandType, Operation};
use crate::config::{ConfigError, Settings};
use crate::control::ControlHandle;
use crate::cooldown::CooldownGate;
use crate::device::DeviceClient;
use crate::dispatcher::{Dispatcher, LinkSignal, LINK_SIGNAL_CAP};
use crate::interaction::InteractionCoalescer;
use crate::osc_net::{OscError, OscInput, OscSender, OscServer, OSC_INBOUND_CAP};
use crate::panel::{self, PanelController, PanelStatus};
use crate::periodic::ScheduledTask;
use crate::queue::PriorityCommandQueue;
use crate::routes::{Route, RouteError, RouteTable};
use crate::sink::CommandSink;
use crate::state::{ChannelStateStore, TierFilter};
use crate::ton::TonAdapter;
use crate::ton_ws::{self, TON_CONTROL_CAP};
use dglab_protocol::{Channel, DeviceEvent, FeedbackButton};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const REBIND_RETRY: Duration = Duration::from_secs(2);
const TON_DECAY_PERIOD: Duration = Duration::from_secs(1);
const FEEDBACK_STEP: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Routes(#[from] RouteError),
    #[error(transparent)]
    Osc(#[from] OscError),
    #[error("invalid address {0}")]
    Address(String),
}

/// A running bridge: dispatchers, adapters and background tasks.
///
/// [`Bridge::new`] starts everything that needs no sockets; OSC and the ToN
/// socket are attached separately so the arbitration core can run on its own.
pub struct Bridge {
    control: ControlHandle,
    osc_tx: mpsc::Sender<OscInput>,
    tasks: Vec<JoinHandle<()>>,
    scheduled: Vec<ScheduledTask>,
    osc_server: Option<OscServer>,
}

impl Bridge {
    pub fn new<D: DeviceClient>(
        settings: &Settings,
        device: Arc<D>,
        events: mpsc::Receiver<DeviceEvent>,
    ) -> Result<Self, BridgeError> {
        settings.validate()?;
        let routes = RouteTable::with_defaults(&settings.osc.interaction)?;

        let states = ChannelStateStore::default();
        let filter = TierFilter::default();
        let queues = [
            Arc::new(PriorityCommandQueue::new()),
            Arc::new(PriorityCommandQueue::new()),
        ];
        let gate = Arc::new(CooldownGate::new(settings.arbitration.cooldowns()));
        let sink = CommandSink::new(gate, queues.clone());

        let mut tasks = Vec::new();
        let mut links = Vec::with_capacity(2);
        for channel in Channel::ALL {
            let Some(writer) = states.take_writer(channel) else {
                continue;
            };
            let (link_tx, link_rx) = mpsc::channel(LINK_SIGNAL_CAP);
            links.push(link_tx);
            let dispatcher = Dispatcher::new(
                Arc::clone(&queues[channel.index()]),
                writer,
                filter.clone(),
                Arc::clone(&device),
                link_rx,
                settings.periodic.pulse_reassert(),
            );
            tasks.push(tokio::spawn(dispatcher.run()));
        }

        let (panel_status, _) = watch::channel(PanelStatus {
            fire_step: settings.panel.fire_step,
            chatbox_enabled: settings.panel.chatbox_enabled,
            ..PanelStatus::default()
        });
        let panel_status = Arc::new(panel_status);
        panel::set_panel_control(&panel_status, &filter, settings.panel.panel_control);
        filter.set_enabled(CommandType::Ton, settings.ton.enabled);
        for &tier in &settings.arbitration.disabled_tiers {
            filter.set_enabled(tier, false);
        }

        let ton = TonAdapter::new(
            settings.ton.clone(),
            sink.clone(),
            states.clone(),
            filter.clone(),
        );
        let interaction = InteractionCoalescer::new(sink.clone(), states.clone());

        tasks.push(tokio::spawn(device_events(
            device,
            events,
            links,
            sink.clone(),
            states.clone(),
        )));

        let (osc_tx, osc_rx) = mpsc::channel(OSC_INBOUND_CAP);
        let panel = PanelController::new(
            sink.clone(),
            states.clone(),
            filter.clone(),
            Arc::clone(&panel_status),
            settings.panel.hold(),
        );
        tasks.push(tokio::spawn(route_osc(osc_rx, routes, panel, interaction.clone())));

        let mut scheduled = Vec::new();
        let reassert_sink = sink.clone();
        scheduled.push(ScheduledTask::every(
            "pulse-reassert",
            settings.periodic.pulse_reassert(),
            move || {
                for channel in Channel::ALL {
                    reassert_sink.send(
                        CommandType::Periodic,
                        channel,
                        Operation::ReassertPulse,
                        "periodic:pulse",
                    );
                }
                async {}
            },
        ));
        scheduled.push(ScheduledTask::every(
            "interaction-flush",
            settings.arbitration.interaction_flush(),
            move || {
                interaction.flush();
                async {}
            },
        ));
        let decay = ton.clone();
        scheduled.push(ScheduledTask::every("ton-decay", TON_DECAY_PERIOD, move || {
            decay.decay();
            async {}
        }));

        tracing::info!("bridge core started");
        Ok(Self {
            control: ControlHandle {
                sink,
                states,
                filter,
                panel: panel_status,
                ton,
                ton_ctl: None,
            },
            osc_tx,
            tasks,
            scheduled,
            osc_server: None,
        })
    }

    /// Core plus OSC in/out and the ToN socket (idle until enabled).
    pub async fn start<D: DeviceClient>(
        settings: &Settings,
        device: Arc<D>,
        events: mpsc::Receiver<DeviceEvent>,
    ) -> Result<Self, BridgeError> {
        let mut bridge = Self::new(settings, device, events)?;
        bridge.attach_osc(settings).await?;
        bridge.attach_ton(settings);
        Ok(bridge)
    }

    pub async fn attach_osc(&mut self, settings: &Settings) -> Result<(), BridgeError> {
        let listen = socket_addr(&settings.osc.listen_host, settings.osc_port)?;
        let target = socket_addr(&settings.osc.vrchat_host, settings.osc.vrchat_port)?;

        let server = OscServer::bind(listen, self.osc_tx.clone()).await?;
        let sender = OscSender::connect(target).await?;
        tracing::info!(%target, "osc output ready");

        let states = self.control.states.clone();
        let panel = Arc::clone(&self.control.panel);
        let mut reporter = ChatboxReporter::new(settings.language, sender.clone());
        self.scheduled.push(ScheduledTask::every(
            "chatbox",
            settings.periodic.chatbox(),
            move || {
                let a = states.snapshot(Channel::A);
                let b = states.snapshot(Channel::B);
                let status = panel.borrow().clone();
                reporter.tick(&a, &b, &status);
                async {}
            },
        ));

        if settings.osc.mirror_strength {
            for channel in Channel::ALL {
                let rx = self.control.states.subscribe(channel);
                self.tasks
                    .push(tokio::spawn(mirror_strength(channel, rx, sender.clone())));
            }
        }

        self.osc_server = Some(server);
        Ok(())
    }

    pub fn attach_ton(&mut self, settings: &Settings) {
        let (tx, rx) = mpsc::channel(TON_CONTROL_CAP);
        self.tasks.push(tokio::spawn(ton_ws::run(
            settings.ton.url.clone(),
            rx,
            self.control.ton.clone(),
            settings.ton.enabled,
        )));
        self.control.ton_ctl = Some(tx);
    }

    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn ton(&self) -> &TonAdapter {
        &self.control.ton
    }

    /// Inbox the OSC server feeds; also usable to inject messages directly.
    pub fn osc_inbox(&self) -> mpsc::Sender<OscInput> {
        self.osc_tx.clone()
    }

    pub fn osc_local_addr(&self) -> Option<SocketAddr> {
        self.osc_server.as_ref().map(|s| s.local_addr())
    }

    pub fn shutdown(&mut self) {
        for task in self.scheduled.drain(..) {
            tracing::debug!(task = task.name(), "cancelling scheduled task");
            task.cancel();
        }
        if let Some(server) = self.osc_server.take() {
            server.shutdown();
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        tracing::info!("bridge stopped");
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr, BridgeError> {
    format!("{host}:{port}")
        .parse()
        .map_err(|_| BridgeError::Address(format!("{host}:{port}")))
}

async fn route_osc(
    mut rx: mpsc::Receiver<OscInput>,
    routes: RouteTable,
    mut panel: PanelController,
    interaction: InteractionCoalescer,
) {
    while let Some(input) = rx.recv().await {
        let Some(route) = routes.resolve(&input.address) else { continue };
        let Some(value) = input.value() else {
            tracing::debug!(address = %input.address, "osc message without numeric argument");
            continue;
        };
        match route {
            Route::Panel(action) => panel.handle(action, value),
            Route::Interaction(channels) => interaction.record(&input.address, value, channels),
        }
    }
}

async fn device_events<D: DeviceClient>(
    device: Arc<D>,
    mut events: mpsc::Receiver<DeviceEvent>,
    links: Vec<mpsc::Sender<LinkSignal>>,
    sink: CommandSink,
    states: ChannelStateStore,
) {
    bind(device.as_ref(), &links).await;

    while let Some(event) = events.recv().await {
        match event {
            DeviceEvent::Strength { data } => {
                for link in &links {
                    let _ = link.send(LinkSignal::Report(data)).await;
                }
            }
            DeviceEvent::Feedback { button } => on_feedback(&sink, &states, button),
            DeviceEvent::Disconnected => {
                tracing::warn!("device disconnected, re-binding");
                for link in &links {
                    let _ = link.send(LinkSignal::Down).await;
                }
                bind(device.as_ref(), &links).await;
            }
        }
    }
}

async fn bind<D: DeviceClient>(device: &D, links: &[mpsc::Sender<LinkSignal>]) {
    loop {
        match device.rebind().await {
            Ok(()) => break,
            Err(e) => {
                tracing::warn!(retry_secs = REBIND_RETRY.as_secs(), "device bind failed: {e}");
                tokio::time::sleep(REBIND_RETRY).await;
            }
        }
    }
    for link in links {
        let _ = link.send(LinkSignal::Reset).await;
    }
}

fn on_feedback(sink: &CommandSink, states: &ChannelStateStore, button: FeedbackButton) {
    let channel = button.channel();
    let operation = match button {
        FeedbackButton::A1 | FeedbackButton::B1 => Operation::Decrease(FEEDBACK_STEP),
        FeedbackButton::A2 | FeedbackButton::B2 => Operation::SetTo(states.snapshot(channel).limit),
        _ => {
            tracing::debug!(?button, "unmapped feedback button");
            return;
        }
    };
    sink.send(
        CommandType::Panel,
        channel,
        operation,
        format!("feedback:{button:?}"),
    );
}

async fn mirror_strength(
    channel: Channel,
    mut rx: watch::Receiver<crate::state::ChannelState>,
    sender: OscSender,
) {
    let address = format!("/avatar/parameters/DG-LAB/Strength_{channel}");
    let mut last = None;
    while rx.changed().await.is_ok() {
        let (strength, limit) = {
            let s = rx.borrow_and_update();
            (s.current_strength, s.limit)
        };
        if last == Some((strength, limit)) {
            continue;
        }
        last = Some((strength, limit));
        let value = if limit > 0 {
            strength as f32 / limit as f32
        } else {
            0.0
        };
        sender.float(&address, value);
    }
}
