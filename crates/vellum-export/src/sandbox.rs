//! Scoped ownership of one host document.

use std::time::Duration;

use log::{debug, trace, warn};

use crate::config::Viewport;
use crate::error::{ExportError, catch_panic};
use crate::host::{DocumentHost, HostDocument};

/// Outcome of [`Sandbox::wait_until_stylable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// A sheet with a readable rule was found.
    pub ready: bool,
    /// Layout passes run while waiting.
    pub attempts: u32,
}

/// A host document that is destroyed when the guard is dropped.
///
/// Creation and teardown are paired one-to-one: [`DocumentHost::destroy`] runs
/// exactly once, whether the owner returns normally, returns early with an
/// error, unwinds, or drops an unfinished future holding the guard.
pub struct Sandbox<'h, H: DocumentHost + ?Sized> {
    host: &'h H,
    document: HostDocument,
}

impl<'h, H: DocumentHost + ?Sized> Sandbox<'h, H> {
    /// Load `html` into a new document on `host`.
    ///
    /// # Errors
    ///
    /// Whatever [`DocumentHost::create`] returns; a panicking host becomes
    /// [`ExportError::Processing`]. No teardown is owed in either case.
    pub fn create(host: &'h H, html: &str, viewport: Viewport) -> Result<Self, ExportError> {
        let document = catch_panic("create", || host.create(html, viewport))?;
        debug!("sandbox created");
        Ok(Self { host, document })
    }

    /// The document.
    #[must_use]
    pub const fn document(&self) -> &HostDocument {
        &self.document
    }

    /// The document, mutably.
    pub const fn document_mut(&mut self) -> &mut HostDocument {
        &mut self.document
    }

    /// Run one layout pass.
    ///
    /// # Errors
    ///
    /// [`ExportError::Processing`] if the host panics.
    pub fn force_layout(&mut self) -> Result<f32, ExportError> {
        let host = self.host;
        let document = &mut self.document;
        catch_panic("layout", || Ok(host.force_layout(document)))
    }

    /// Poll until some sheet has a readable rule.
    ///
    /// Each attempt forces a layout pass (which may finish pending loads) and
    /// then checks the sheets; attempts are `interval` apart and there are at
    /// most `max_attempts` of them. When `settle_when_idle` is set, polling
    /// also stops as soon as no sheet is still loading. Running out of
    /// attempts is not an error.
    ///
    /// # Errors
    ///
    /// [`ExportError::Processing`] if the host panics during layout.
    pub async fn wait_until_stylable(
        &mut self,
        max_attempts: u32,
        interval: Duration,
        settle_when_idle: bool,
    ) -> Result<Readiness, ExportError> {
        for attempt in 1..=max_attempts {
            let height = self.force_layout()?;
            trace!("poll {attempt}/{max_attempts}: layout height {height}px");

            if self.document.is_stylable() {
                debug!("sandbox stylable after {attempt} attempts");
                return Ok(Readiness {
                    ready: true,
                    attempts: attempt,
                });
            }
            if settle_when_idle && !self.document.has_pending_sheets() {
                debug!("no readable rules and nothing loading; continuing unstyled");
                return Ok(Readiness {
                    ready: false,
                    attempts: attempt,
                });
            }
            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }
        warn!("style sheets not readable after {max_attempts} attempts; exporting anyway");
        Ok(Readiness {
            ready: false,
            attempts: max_attempts,
        })
    }
}

impl<H: DocumentHost + ?Sized> Drop for Sandbox<'_, H> {
    fn drop(&mut self) {
        self.host.destroy(&mut self.document);
        debug!("sandbox destroyed");
    }
}
