//! Operator-to-receiver tests over all three channel variants

use estop_core::config::LinkTimings;
use estop_core::node::{OperatorInputs, OperatorPanel, OperatorState, ReceiverNode, ReceiverTick};
use estop_core::{Channel, CompletionFlag, SafetyLink, TransmitScheduler};
use estop_protocol::{ChannelState, PropertyId};

use crate::channel::{BroadcastLink, RadioLink, RadioRole, ShortRangeLink};
use crate::testing::MemoryTransport;

const IDLE: OperatorInputs = OperatorInputs {
    estop_pressed: false,
    soft_estop_pressed: false,
    release_pressed: false,
};

const RELEASE: OperatorInputs = OperatorInputs {
    estop_pressed: false,
    soft_estop_pressed: false,
    release_pressed: true,
};

const ESTOP: OperatorInputs = OperatorInputs {
    estop_pressed: true,
    soft_estop_pressed: false,
    release_pressed: false,
};

struct Operator<'a> {
    panel: OperatorPanel,
    uplink: SafetyLink<0>,
    scheduler: TransmitScheduler<OperatorState>,
    radio: RadioLink<'a, MemoryTransport>,
    short_range: ShortRangeLink<MemoryTransport>,
    broadcast: BroadcastLink<MemoryTransport>,
}

impl<'a> Operator<'a> {
    fn new(tx_done: &'a CompletionFlag, timings: &LinkTimings) -> Self {
        let mut op = Self {
            panel: OperatorPanel::new(),
            uplink: SafetyLink::uplink_only(timings),
            scheduler: TransmitScheduler::new(timings.transmit_interval_ms),
            radio: RadioLink::new(
                MemoryTransport::new(),
                RadioRole::Broadcaster,
                tx_done,
                timings,
            ),
            short_range: ShortRangeLink::new(MemoryTransport::new(), timings),
            broadcast: BroadcastLink::new(MemoryTransport::new(), timings),
        };
        op.radio.start();
        op.short_range.start();
        op.broadcast.start();
        op
    }

    fn tick(&mut self, inputs: OperatorInputs, dt_ms: u32) {
        let state = self.panel.update(inputs);
        let mut channels: [&mut dyn Channel; 3] =
            [&mut self.radio, &mut self.short_range, &mut self.broadcast];
        self.uplink.update(&mut channels, dt_ms);
        self.scheduler.publish(&mut channels, &state, dt_ms);
    }
}

struct Receiver<'a> {
    node: ReceiverNode,
    radio: RadioLink<'a, MemoryTransport>,
    short_range: ShortRangeLink<MemoryTransport>,
    broadcast: BroadcastLink<MemoryTransport>,
}

impl<'a> Receiver<'a> {
    fn new(rx_ready: &'a CompletionFlag, timings: &LinkTimings) -> Self {
        let mut rx = Self {
            node: ReceiverNode::new(timings),
            radio: RadioLink::new(
                MemoryTransport::new(),
                RadioRole::Listener,
                rx_ready,
                timings,
            ),
            short_range: ShortRangeLink::new(MemoryTransport::new(), timings),
            broadcast: BroadcastLink::new(MemoryTransport::new(), timings),
        };
        rx.radio.start();
        rx.short_range.start();
        rx.broadcast.start();
        rx
    }

    fn tick(&mut self, dt_ms: u32) -> ReceiverTick {
        let mut remote: [&mut dyn Channel; 3] =
            [&mut self.radio, &mut self.short_range, &mut self.broadcast];
        self.node.update(&mut remote, &mut [], dt_ms)
    }
}

/// Carry one tick's worth of traffic, or lose it all
fn exchange(
    op: &mut Operator,
    rx: &mut Receiver,
    tx_done: &CompletionFlag,
    rx_ready: &CompletionFlag,
    connected: bool,
) {
    if !connected {
        op.radio.transport_mut().sent.clear();
        op.short_range.transport_mut().sent.clear();
        op.broadcast.transport_mut().sent.clear();
        rx.broadcast.transport_mut().sent.clear();
        return;
    }

    if !op.radio.transport().sent.is_empty() {
        op.radio.transport_mut().deliver_to(rx.radio.transport_mut());
        tx_done.signal();
        rx_ready.signal();
    }
    op.short_range
        .transport_mut()
        .deliver_to(rx.short_range.transport_mut());
    op.broadcast
        .transport_mut()
        .deliver_to(rx.broadcast.transport_mut());
    rx.broadcast
        .transport_mut()
        .deliver_to(op.broadcast.transport_mut());
}

fn run(
    op: &mut Operator,
    rx: &mut Receiver,
    tx_done: &CompletionFlag,
    rx_ready: &CompletionFlag,
    inputs: OperatorInputs,
    ticks: u32,
    connected: bool,
) -> ReceiverTick {
    let mut last = None;
    for _ in 0..ticks {
        op.tick(inputs, 1);
        exchange(op, rx, tx_done, rx_ready, connected);
        last = Some(rx.tick(1));
    }
    last.unwrap()
}

#[test]
fn test_boot_holds_stop_until_release() {
    let timings = LinkTimings::default();
    let (tx_done, rx_ready) = (CompletionFlag::new(), CompletionFlag::new());
    let mut op = Operator::new(&tx_done, &timings);
    let mut rx = Receiver::new(&rx_ready, &timings);

    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 50, true);
    assert!(tick.stop_asserted);
    assert!(tick.state.hard_estop_active);

    run(&mut op, &mut rx, &tx_done, &rx_ready, RELEASE, 1, true);
    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 1, true);
    assert!(!tick.stop_asserted);
    assert!(!tick.state.soft_estop_active);
}

#[test]
fn test_press_reaches_receiver_within_a_tick() {
    let timings = LinkTimings::default();
    let (tx_done, rx_ready) = (CompletionFlag::new(), CompletionFlag::new());
    let mut op = Operator::new(&tx_done, &timings);
    let mut rx = Receiver::new(&rx_ready, &timings);

    run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 10, true);
    run(&mut op, &mut rx, &tx_done, &rx_ready, RELEASE, 1, true);
    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 50, true);
    assert!(!tick.stop_asserted);

    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, ESTOP, 1, true);
    assert!(tick.state.hard_estop_active);
    assert!(tick.stop_asserted);
    assert!(tick.report_state);
}

#[test]
fn test_silence_disconnects_and_forces_stop() {
    let timings = LinkTimings::default();
    let (tx_done, rx_ready) = (CompletionFlag::new(), CompletionFlag::new());
    let mut op = Operator::new(&tx_done, &timings);
    let mut rx = Receiver::new(&rx_ready, &timings);

    run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 10, true);
    run(&mut op, &mut rx, &tx_done, &rx_ready, RELEASE, 1, true);
    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 300, true);
    assert!(!tick.stop_asserted);
    assert_eq!(rx.radio.connection_state(), ChannelState::Connected);
    assert_eq!(op.broadcast.connection_state(), ChannelState::Connected);

    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 600, false);
    assert!(tick.stop_asserted);
    assert!(tick.state.hard_estop_active);
    assert_eq!(rx.radio.connection_state(), ChannelState::Disconnected);
    assert_eq!(rx.short_range.connection_state(), ChannelState::Disconnected);
    assert_eq!(rx.broadcast.connection_state(), ChannelState::Disconnected);

    // The last raw value was permissive; the floor overrides it
    assert!(!rx.broadcast.read_property(PropertyId::Estop).flag());
    assert!(!rx.short_range.read_property(PropertyId::Estop).flag());

    // Operator side: broadcast loses its acks, the radio broadcaster does not care
    assert_eq!(op.broadcast.connection_state(), ChannelState::Disconnected);
    assert_eq!(op.radio.connection_state(), ChannelState::Connected);
}

#[test]
fn test_single_surviving_channel_keeps_link() {
    let timings = LinkTimings::default();
    let (tx_done, rx_ready) = (CompletionFlag::new(), CompletionFlag::new());
    let mut op = Operator::new(&tx_done, &timings);
    let mut rx = Receiver::new(&rx_ready, &timings);

    run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 10, true);
    run(&mut op, &mut rx, &tx_done, &rx_ready, RELEASE, 1, true);

    // Short-range and broadcast radios die; only the long-range radio remains
    op.short_range.transport_mut().fault = true;
    op.broadcast.transport_mut().fault = true;
    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 1_000, true);

    assert_eq!(rx.short_range.connection_state(), ChannelState::Disconnected);
    assert_eq!(rx.broadcast.connection_state(), ChannelState::Disconnected);
    assert_eq!(rx.radio.connection_state(), ChannelState::Connected);
    assert!(!tick.stop_asserted);

    // The radio picks up the change on its next send
    run(&mut op, &mut rx, &tx_done, &rx_ready, ESTOP, 1, true);
    let tick = run(&mut op, &mut rx, &tx_done, &rx_ready, IDLE, 1, true);
    assert!(tick.stop_asserted);
    assert!(rx.radio.read_property(PropertyId::Estop).flag());
}

/// Long-range packet time on air at the reference radio's ~9 packets/s
const AIRTIME_MS: u32 = 111;

/// Radio-only link where each packet is on air for [`AIRTIME_MS`] before
/// it lands and TX-done fires
struct OnAir {
    remaining_ms: Option<u32>,
}

impl OnAir {
    fn step(
        &mut self,
        op: &mut Operator,
        rx: &mut Receiver,
        tx_done: &CompletionFlag,
        rx_ready: &CompletionFlag,
    ) {
        match self.remaining_ms {
            None if !op.radio.transport().sent.is_empty() => {
                self.remaining_ms = Some(AIRTIME_MS - 1);
            }
            Some(0) => {
                // One packet lands per transmission
                let packet = op.radio.transport_mut().sent.remove(0);
                rx.radio.transport_mut().push_inbound(&packet, Some(-110));
                tx_done.signal();
                rx_ready.signal();
                self.remaining_ms = None;
            }
            Some(ms) => self.remaining_ms = Some(ms - 1),
            None => {}
        }
    }
}

#[test]
fn test_radio_only_link_holds_release_at_real_airtime() {
    let timings = LinkTimings::default();
    let (tx_done, rx_ready) = (CompletionFlag::new(), CompletionFlag::new());
    let mut op = Operator::new(&tx_done, &timings);
    let mut rx = Receiver::new(&rx_ready, &timings);
    op.short_range.transport_mut().fault = true;
    op.broadcast.transport_mut().fault = true;
    let mut air = OnAir { remaining_ms: None };

    let mut released_at = None;
    let mut stop_ticks_after_release = 0;
    let mut max_estop_age = 0;
    for t in 0..4_000u32 {
        let inputs = if t == 200 { RELEASE } else { IDLE };
        op.tick(inputs, 1);
        air.step(&mut op, &mut rx, &tx_done, &rx_ready);
        let tick = rx.tick(1);

        match released_at {
            None if !tick.stop_asserted => released_at = Some(t),
            Some(_) => {
                let age = rx.radio.read_property(PropertyId::Estop).age_ms;
                max_estop_age = max_estop_age.max(age);
                if tick.stop_asserted {
                    stop_ticks_after_release += 1;
                }
            }
            None => {}
        }
    }

    let released_at = released_at.expect("release never reached the receiver");
    assert!(released_at < 200 + 3 * AIRTIME_MS);
    assert_eq!(rx.short_range.connection_state(), ChannelState::Disconnected);
    assert_eq!(rx.broadcast.connection_state(), ChannelState::Disconnected);
    assert_eq!(rx.radio.connection_state(), ChannelState::Connected);
    assert!(max_estop_age + timings.radio_latency_bias_ms < timings.stale_threshold_ms);
    assert_eq!(stop_ticks_after_release, 0);
}
