use crate::strokes::capture::TimerTicket;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_QUIET_TIMER_MS: u64 = 500;

#[derive(Debug)]
enum TimerCommand {
    Arm { ticket: TimerTicket, delay: Duration },
    Cancel,
    Shutdown,
}

/// Single-shot, cancellable delayed callback.
///
/// At most one ticket is armed at a time; arming again replaces it. The
/// callback runs on the timer's worker thread.
pub struct QuietTimer {
    command_tx: Sender<TimerCommand>,
    join: Option<JoinHandle<()>>,
}

impl QuietTimer {
    pub fn spawn<F>(callback: F) -> Self
    where
        F: Fn(TimerTicket) + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let join = thread::spawn(move || timer_loop(command_rx, callback));
        Self {
            command_tx,
            join: Some(join),
        }
    }

    pub fn arm(&self, ticket: TimerTicket, delay: Duration) {
        if self
            .command_tx
            .send(TimerCommand::Arm { ticket, delay })
            .is_err()
        {
            tracing::error!(generation = ticket.generation(), "quiet timer worker is gone");
        }
    }

    pub fn cancel(&self) {
        let _ = self.command_tx.send(TimerCommand::Cancel);
    }
}

impl Drop for QuietTimer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(TimerCommand::Shutdown);
        if let Some(join) = self.join.take() {
            if join.thread().id() != thread::current().id() {
                let _ = join.join();
            }
        }
    }
}

fn timer_loop<F>(command_rx: Receiver<TimerCommand>, callback: F)
where
    F: Fn(TimerTicket),
{
    let mut armed: Option<(TimerTicket, Instant)> = None;
    loop {
        let command = match armed {
            Some((ticket, deadline)) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match command_rx.recv_timeout(remaining) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => {
                        armed = None;
                        callback(ticket);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match command_rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            TimerCommand::Arm { ticket, delay } => {
                armed = Some((ticket, Instant::now() + delay));
            }
            TimerCommand::Cancel => armed = None,
            TimerCommand::Shutdown => break,
        }
    }
}
