//! MCP server session.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool, resource and prompt requests
//! 3. **Shutdown**: End of input or a termination signal
//!
//! The session reads one message at a time and writes its reply before
//! reading the next, so responses always leave in request order.

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::error::{ServerError, TransportError};
use crate::mcp::dispatcher::{Dispatcher, ServerState};
use crate::mcp::protocol::{parse_value, JsonRpcError};
use crate::mcp::transport::Transport;

/// One client session: a transport plus the dispatcher it feeds.
pub struct McpServer<R, W> {
    /// Message transport.
    transport: Transport<R, W>,
    /// Request router.
    dispatcher: Dispatcher,
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a session over `transport`.
    pub const fn new(transport: Transport<R, W>, dispatcher: Dispatcher) -> Self {
        Self {
            transport,
            dispatcher,
        }
    }

    /// Returns the dispatcher.
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Consumes the session, returning its transport.
    pub fn into_transport(self) -> Transport<R, W> {
        self.transport
    }

    /// Runs the session until end of input or a termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handlers cannot be installed or the
    /// transport fails.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> Result<(), ServerError> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(ServerError::Signal)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(ServerError::Signal)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    self.dispatcher.shut_down();
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                    self.dispatcher.shut_down();
                    return Ok(());
                }

                done = self.step() => {
                    if done? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> Result<(), ServerError> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    self.dispatcher.shut_down();
                    return Ok(());
                }

                done = self.step() => {
                    if done? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Processes messages until end of input, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn serve(&mut self) -> Result<(), ServerError> {
        while !self.step().await? {}
        Ok(())
    }

    /// Reads, dispatches and answers one message.
    ///
    /// Returns `true` if the session should end.
    async fn step(&mut self) -> Result<bool, ServerError> {
        let value = match self.transport.receive().await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Input closed, shutting down");
                self.dispatcher.shut_down();
                return Ok(true);
            }
            Err(TransportError::Decode(e)) => {
                warn!(error = %e, "Received undecodable frame, closing session");
                // The peer may already be gone; the decode error is what matters
                if let Err(send_error) = self.transport.send(&JsonRpcError::parse_error().into()).await
                {
                    debug!(error = %send_error, "Could not report parse error");
                }
                self.dispatcher.shut_down();
                return Err(TransportError::Decode(e).into());
            }
            Err(e) => return Err(e.into()),
        };

        let reply = match parse_value(value) {
            Ok(message) => self.dispatcher.dispatch(&message),
            Err(error) => {
                warn!(code = error.error.code, "Rejected malformed request");
                Some(error.into())
            }
        };

        if let Some(reply) = reply {
            self.transport.send(&reply).await?;
        }

        Ok(self.dispatcher.state() == ServerState::ShuttingDown)
    }
}
