use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::foundation::core::{DVec3, Fps, FrameIndex, Rect, Rgba8Premul};
use crate::effects::processor::VideoEffect;
use crate::render::bounds::BoundsDevice;

type Log = Rc<RefCell<Vec<String>>>;

struct Recording {
    name: &'static str,
    enabled: Cell<bool>,
    log: Log,
    serial: Cell<u32>,
}

struct RecordingProcessor {
    tag: String,
    node: NodeId,
    log: Log,
}

impl VideoEffect for Recording {
    fn label(&self) -> &str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn create_processor(
        &self,
        dev: &mut dyn RenderDevice,
    ) -> ShapeFxResult<Box<dyn EffectProcessor>> {
        let n = self.serial.get() + 1;
        self.serial.set(n);
        let tag = format!("{}#{n}", self.name);
        self.log.borrow_mut().push(format!("create {tag}"));
        Ok(Box::new(RecordingProcessor {
            tag,
            node: dev.create_node(NodeKind::Transform2d)?,
            log: self.log.clone(),
        }))
    }
}

impl EffectProcessor for RecordingProcessor {
    fn set_input(
        &mut self,
        dev: &mut dyn RenderDevice,
        input: Option<ImageRef>,
    ) -> ShapeFxResult<()> {
        dev.set_input(self.node, 0, input)
    }

    fn output(&self) -> ImageRef {
        self.node.output()
    }

    fn update(
        &mut self,
        _dev: &mut dyn RenderDevice,
        ctx: &FrameContext,
    ) -> ShapeFxResult<DrawDescription> {
        self.log.borrow_mut().push(format!("update {}", self.tag));
        let mut d = ctx.draw;
        d.draw.x += 1.0;
        Ok(d)
    }

    fn clear_input(&mut self, dev: &mut dyn RenderDevice) -> ShapeFxResult<()> {
        self.log.borrow_mut().push(format!("clear {}", self.tag));
        dev.set_input(self.node, 0, None)
    }

    fn dispose(self: Box<Self>, dev: &mut dyn RenderDevice) {
        self.log.borrow_mut().push(format!("dispose {}", self.tag));
        dev.dispose_node(self.node);
    }
}

fn effect(name: &'static str, log: &Log) -> (EffectHandle, Rc<Recording>) {
    let rec = Rc::new(Recording {
        name,
        enabled: Cell::new(true),
        log: log.clone(),
        serial: Cell::new(0),
    });
    (EffectHandle::from_rc(rec.clone()), rec)
}

fn ctx() -> FrameContext {
    FrameContext::new(FrameIndex(0), 10, Fps::new(30, 1).unwrap())
}

fn source(dev: &mut BoundsDevice) -> ImageRef {
    dev.flood(Rect::new(0.0, 0.0, 10.0, 10.0), Rgba8Premul::from_straight_rgba(0, 0, 0, 0))
        .unwrap()
        .output()
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn reorder_keeps_processors_and_order() {
    let log = Log::default();
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let (a, _) = effect("a", &log);
    let (b, _) = effect("b", &log);
    let (c, _) = effect("c", &log);

    chain
        .reconcile(&mut dev, &[a.clone(), b.clone(), c.clone()])
        .unwrap();
    assert_eq!(drain(&log), ["create a#1", "create b#1", "create c#1"]);

    chain
        .reconcile(&mut dev, &[c.clone(), a.clone(), b.clone()])
        .unwrap();
    assert!(drain(&log).is_empty());
    assert_eq!(chain.keys(), vec![c.key(), a.key(), b.key()]);

    chain.dispose(&mut dev);
}

#[test]
fn removed_spec_is_cleared_then_disposed_once() {
    let log = Log::default();
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let (a, _) = effect("a", &log);
    let (b, _) = effect("b", &log);
    let (d, _) = effect("d", &log);

    chain.reconcile(&mut dev, &[a.clone(), b.clone()]).unwrap();
    drain(&log);

    chain.reconcile(&mut dev, &[b.clone(), d.clone()]).unwrap();
    assert_eq!(drain(&log), ["clear a#1", "dispose a#1", "create d#1"]);
    assert_eq!(chain.keys(), vec![b.key(), d.key()]);

    chain.dispose(&mut dev);
    assert_eq!(dev.live_nodes(), 0);
    assert_eq!(dev.stats().invalid_disposals, 0);
}

#[test]
fn duplicate_spec_gets_its_own_processor() {
    let log = Log::default();
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let (a, _) = effect("a", &log);

    chain.reconcile(&mut dev, &[a.clone(), a.clone()]).unwrap();
    assert_eq!(drain(&log), ["create a#1", "create a#2"]);

    chain.reconcile(&mut dev, std::slice::from_ref(&a)).unwrap();
    assert_eq!(drain(&log), ["clear a#2", "dispose a#2"]);
    assert_eq!(chain.len(), 1);

    chain.dispose(&mut dev);
    assert_eq!(dev.live_nodes(), 0);
}

#[test]
fn update_folds_descriptor_and_skips_disabled() {
    let log = Log::default();
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let (a, _) = effect("a", &log);
    let (b, b_rec) = effect("b", &log);
    let (c, _) = effect("c", &log);
    chain.reconcile(&mut dev, &[a, b, c]).unwrap();
    drain(&log);

    let img = source(&mut dev);
    chain.set_input(&mut dev, Some(img)).unwrap();
    let desc = chain.update_output_and_description(&mut dev, &ctx()).unwrap();
    assert_eq!(desc.draw, DVec3::new(3.0, 0.0, 0.0));
    assert_eq!(drain(&log), ["update a#1", "update b#1", "update c#1"]);

    b_rec.enabled.set(false);
    let desc = chain.update_output_and_description(&mut dev, &ctx()).unwrap();
    assert_eq!(desc.draw, DVec3::new(2.0, 0.0, 0.0));
    assert_eq!(drain(&log), ["update a#1", "update c#1"]);
    assert_eq!(chain.len(), 3);
    assert_eq!(
        dev.image_bounds(chain.output()).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    );

    chain.dispose(&mut dev);
}

#[test]
fn empty_chain_passes_input_through() {
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let img = source(&mut dev);

    chain.reconcile(&mut dev, &[]).unwrap();
    chain.set_input(&mut dev, Some(img)).unwrap();
    let desc = chain.update_output_and_description(&mut dev, &ctx()).unwrap();
    assert_eq!(desc, ctx().draw);
    assert_eq!(
        dev.image_bounds(chain.output()).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    );

    chain.dispose(&mut dev);
}

#[test]
fn no_input_yields_empty_output_and_unchanged_descriptor() {
    let log = Log::default();
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let (a, _) = effect("a", &log);
    chain.reconcile(&mut dev, &[a]).unwrap();
    drain(&log);

    let desc = chain.update_output_and_description(&mut dev, &ctx()).unwrap();
    assert_eq!(desc, ctx().draw);
    assert!(drain(&log).is_empty());
    assert_eq!(dev.image_bounds(chain.output()).unwrap(), Rect::ZERO);

    chain.dispose(&mut dev);
}

#[test]
fn clears_are_idempotent() {
    let log = Log::default();
    let mut dev = BoundsDevice::default();
    let mut chain = EffectChain::new(&mut dev).unwrap();
    let (a, _) = effect("a", &log);
    chain.reconcile(&mut dev, &[a.clone()]).unwrap();
    let img = source(&mut dev);
    chain.set_input(&mut dev, Some(img)).unwrap();
    drain(&log);

    chain.clear_chain(&mut dev).unwrap();
    assert_eq!(drain(&log), ["clear a#1", "dispose a#1"]);
    chain.clear_chain(&mut dev).unwrap();
    assert!(drain(&log).is_empty());
    assert_eq!(
        dev.image_bounds(chain.output()).unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    );

    chain.reconcile(&mut dev, &[a]).unwrap();
    drain(&log);
    chain.clear_input(&mut dev).unwrap();
    chain.clear_input(&mut dev).unwrap();
    assert_eq!(drain(&log), ["clear a#2", "dispose a#2"]);
    assert!(chain.is_empty());
    assert_eq!(dev.image_bounds(chain.output()).unwrap(), Rect::ZERO);

    chain.dispose(&mut dev);
    // Only the flood source remains.
    assert_eq!(dev.live_nodes(), 1);
}
