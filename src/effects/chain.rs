//! Ordered sub-effect chain applied to the shape image.
//!
//! The chain keeps one live processor per effect spec and reconciles that list against the
//! editing layer's current spec list: processors survive as long as their spec stays in the
//! list (even when it moves), removed specs are released, new specs are instantiated.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::effects::draw::{DrawDescription, FrameContext};
use crate::effects::processor::{EffectHandle, EffectKey, EffectProcessor};
use crate::foundation::error::ShapeFxResult;
use crate::render::device::{ImageRef, NodeId, NodeKind, RenderDevice};
use crate::render::dispose::DisposeCollector;

struct ChainEntry {
    effect: EffectHandle,
    processor: Box<dyn EffectProcessor>,
}

/// See the module docs.
pub struct EffectChain {
    disposer: DisposeCollector,
    passthrough: NodeId,
    empty: NodeId,
    input: Option<ImageRef>,
    output_empty: bool,
    entries: Vec<ChainEntry>,
}

impl EffectChain {
    /// Allocate the chain's passthrough and empty-image nodes.
    pub fn new(dev: &mut dyn RenderDevice) -> ShapeFxResult<Self> {
        let (disposer, (passthrough, empty)) = DisposeCollector::build_with(dev, |c, dev| {
            let passthrough = c.create(dev, NodeKind::Transform2d)?;
            let empty = c.create(dev, NodeKind::Empty)?;
            Ok((passthrough, empty))
        })?;
        Ok(Self {
            disposer,
            passthrough,
            empty,
            input: None,
            output_empty: true,
            entries: Vec::new(),
        })
    }

    /// Number of live processors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no processors are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identity keys of the live processors, in application order.
    pub fn keys(&self) -> Vec<EffectKey> {
        self.entries.iter().map(|e| e.effect.key()).collect()
    }

    /// Image after the chain, or an empty image when there is no input.
    pub fn output(&self) -> ImageRef {
        if self.output_empty {
            self.empty.output()
        } else {
            self.passthrough.output()
        }
    }

    /// Bring the live processors in line with `effects`.
    pub fn reconcile(
        &mut self,
        dev: &mut dyn RenderDevice,
        effects: &[EffectHandle],
    ) -> ShapeFxResult<()> {
        let wanted: HashSet<EffectKey> = effects.iter().map(EffectHandle::key).collect();
        let removed: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !wanted.contains(&e.effect.key()))
            .map(|(i, _)| i)
            .collect();
        for &idx in removed.iter().rev() {
            let entry = self.entries.remove(idx);
            release(dev, entry);
        }

        let mut kept: HashMap<EffectKey, VecDeque<ChainEntry>> = HashMap::new();
        for entry in self.entries.drain(..) {
            kept.entry(entry.effect.key()).or_default().push_back(entry);
        }

        let mut next = Vec::with_capacity(effects.len());
        for effect in effects {
            if let Some(entry) = kept
                .get_mut(&effect.key())
                .and_then(VecDeque::pop_front)
            {
                next.push(entry);
                continue;
            }
            match effect.effect().create_processor(dev) {
                Ok(processor) => {
                    tracing::debug!(effect = effect.effect().label(), "created effect processor");
                    next.push(ChainEntry {
                        effect: effect.clone(),
                        processor,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        effect = effect.effect().label(),
                        error = %err,
                        "effect processor could not be created; effect skipped"
                    );
                }
            }
        }

        // Surplus duplicates of a spec that appears fewer times than before.
        for entry in kept.into_values().flatten() {
            release(dev, entry);
        }

        self.entries = next;
        self.set_input(dev, self.input)
    }

    /// Feed `input` into the first processor and route the last processor to the output.
    pub fn set_input(
        &mut self,
        dev: &mut dyn RenderDevice,
        input: Option<ImageRef>,
    ) -> ShapeFxResult<()> {
        self.input = input;
        let Some(image) = input else {
            self.output_empty = true;
            return dev.set_input(self.passthrough, 0, None);
        };

        if let Some(first) = self.entries.first_mut() {
            first.processor.set_input(dev, Some(image))?;
            let last = self.entries.last().map(|e| e.processor.output());
            dev.set_input(self.passthrough, 0, last)?;
        } else {
            dev.set_input(self.passthrough, 0, Some(image))?;
        }
        self.output_empty = false;
        Ok(())
    }

    /// Run every enabled processor in order, folding the draw descriptor through them.
    pub fn update_output_and_description(
        &mut self,
        dev: &mut dyn RenderDevice,
        ctx: &FrameContext,
    ) -> ShapeFxResult<DrawDescription> {
        let Some(mut image) = self.input else {
            self.output_empty = true;
            dev.set_input(self.passthrough, 0, None)?;
            return Ok(ctx.draw);
        };

        let mut desc = ctx.draw;
        for entry in &mut self.entries {
            if !entry.effect.effect().is_enabled() {
                continue;
            }
            entry.processor.set_input(dev, Some(image))?;
            desc = entry.processor.update(dev, &ctx.with_draw(desc))?;
            image = entry.processor.output();
        }

        dev.set_input(self.passthrough, 0, Some(image))?;
        self.output_empty = false;
        Ok(desc)
    }

    /// Release every processor; the input stays attached and passes straight through.
    pub fn clear_chain(&mut self, dev: &mut dyn RenderDevice) -> ShapeFxResult<()> {
        for entry in self.entries.drain(..) {
            release(dev, entry);
        }
        dev.set_input(self.passthrough, 0, self.input)
    }

    /// Release every processor and forget the input.
    pub fn clear_input(&mut self, dev: &mut dyn RenderDevice) -> ShapeFxResult<()> {
        self.input = None;
        self.output_empty = true;
        dev.set_input(self.passthrough, 0, None)?;
        for entry in self.entries.drain(..) {
            release(dev, entry);
        }
        Ok(())
    }

    /// Release the chain's own nodes and every processor.
    pub fn dispose(mut self, dev: &mut dyn RenderDevice) {
        if let Err(err) = dev.set_input(self.passthrough, 0, None) {
            tracing::debug!(error = %err, "detaching chain passthrough failed");
        }
        for entry in self.entries.drain(..) {
            release(dev, entry);
        }
        self.disposer.dispose_all(dev);
    }
}

fn release(dev: &mut dyn RenderDevice, entry: ChainEntry) {
    let ChainEntry {
        effect,
        mut processor,
    } = entry;
    if let Err(err) = processor.clear_input(dev) {
        tracing::debug!(effect = effect.effect().label(), error = %err, "clear_input failed");
    }
    processor.dispose(dev);
    tracing::debug!(effect = effect.effect().label(), "disposed effect processor");
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chain.rs"]
mod tests;
