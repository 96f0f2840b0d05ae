use crate::foundation::error::ShapeFxResult;
use crate::render::device::{NodeId, NodeKind, RenderDevice};

/// Records every node acquired by an owner so that all of them are released together.
///
/// Release happens in reverse acquisition order. A collector that is dropped while still holding
/// nodes logs the leak; owners must call [`DisposeCollector::dispose_all`] on teardown.
#[derive(Debug, Default)]
pub struct DisposeCollector {
    nodes: Vec<NodeId>,
}

impl DisposeCollector {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `build`, releasing everything it collected when it fails.
    pub fn build_with<T>(
        dev: &mut dyn RenderDevice,
        build: impl FnOnce(&mut Self, &mut dyn RenderDevice) -> ShapeFxResult<T>,
    ) -> ShapeFxResult<(Self, T)> {
        let mut collector = Self::new();
        match build(&mut collector, dev) {
            Ok(v) => Ok((collector, v)),
            Err(e) => {
                collector.dispose_all(dev);
                Err(e)
            }
        }
    }

    /// Create a node on `dev` and register it.
    pub fn create(&mut self, dev: &mut dyn RenderDevice, kind: NodeKind) -> ShapeFxResult<NodeId> {
        let node = dev.create_node(kind)?;
        self.nodes.push(node);
        Ok(node)
    }

    /// Release every registered node, newest first. Safe to call repeatedly.
    pub fn dispose_all(&mut self, dev: &mut dyn RenderDevice) {
        while let Some(node) = self.nodes.pop() {
            dev.dispose_node(node);
        }
    }

    /// Number of nodes still held.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Drop for DisposeCollector {
    fn drop(&mut self) {
        if !self.nodes.is_empty() {
            tracing::warn!(
                leaked = self.nodes.len(),
                "DisposeCollector dropped without dispose_all"
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispose.rs"]
mod tests;
