use crate::core::cancel::CancelToken;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::mpsc as std_mpsc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// One decoded operator keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// Escape (or Ctrl-C, which raw mode delivers as a key event): cancel
    Escape,
    /// Enter: manual power-cycle
    Enter,
    /// Any printable key
    Char(char),
}

/// Control signals consumed by the reader loop in FIFO order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyControl {
    Pause,
    Resume,
    Stop,
}

/// Background keystroke producer.
///
/// A dedicated thread blocks on terminal events and pushes decoded
/// keystrokes onto an unbounded channel, independent of device I/O timing.
/// The main loop is the sole consumer and drains it one keystroke per
/// iteration via [`poll`](Self::poll), which never blocks.
pub struct KeyInputSource {
    rx: mpsc::UnboundedReceiver<Keystroke>,
    ctrl: std_mpsc::Sender<KeyControl>,
}

impl KeyInputSource {
    /// Start the reader thread. A terminal read failure makes operator
    /// cancellation impossible, so it requests cancellation itself before
    /// the thread exits.
    pub fn spawn(cancel: CancelToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (ctrl_tx, ctrl_rx) = std_mpsc::channel();

        std::thread::Builder::new()
            .name("key-input".to_string())
            .spawn(move || reader_loop(tx, ctrl_rx, cancel))
            .expect("failed to spawn key input thread");

        Self { rx, ctrl: ctrl_tx }
    }

    /// A source with no reader thread, fed manually through the returned
    /// sender. Used by tests to script operator input.
    pub fn detached() -> (mpsc::UnboundedSender<Keystroke>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (ctrl_tx, _ctrl_rx) = std_mpsc::channel();
        (tx, Self { rx, ctrl: ctrl_tx })
    }

    /// Take at most one pending keystroke without blocking
    pub fn poll(&mut self) -> Option<Keystroke> {
        self.rx.try_recv().ok()
    }

    /// Suspend keystroke production until [`resume`](Self::resume)
    pub fn pause(&self) {
        let _ = self.ctrl.send(KeyControl::Pause);
    }

    pub fn resume(&self) {
        let _ = self.ctrl.send(KeyControl::Resume);
    }

    /// Terminate the reader permanently; takes effect after its next event
    pub fn stop(&self) {
        let _ = self.ctrl.send(KeyControl::Stop);
    }
}

fn reader_loop(
    tx: mpsc::UnboundedSender<Keystroke>,
    ctrl: std_mpsc::Receiver<KeyControl>,
    cancel: CancelToken,
) {
    loop {
        let ev = match event::read() {
            Ok(ev) => ev,
            Err(e) => {
                error!("terminal input failed, cancelling run: {}", e);
                cancel.request();
                return;
            }
        };

        if let Some(key) = decode(&ev) {
            debug!(?key, "keystroke");
            if tx.send(key).is_err() {
                return;
            }
        }

        // Control signals are checked between events, matching their FIFO
        // position relative to produced keystrokes
        loop {
            match ctrl.try_recv() {
                Ok(KeyControl::Pause) => {
                    if !wait_for_resume(&ctrl) {
                        return;
                    }
                }
                Ok(KeyControl::Resume) => {}
                Ok(KeyControl::Stop) => return,
                Err(std_mpsc::TryRecvError::Empty) => break,
                Err(std_mpsc::TryRecvError::Disconnected) => return,
            }
        }
    }
}

/// Block until a resume arrives; false means the source should terminate
fn wait_for_resume(ctrl: &std_mpsc::Receiver<KeyControl>) -> bool {
    loop {
        match ctrl.recv() {
            Ok(KeyControl::Resume) => return true,
            Ok(KeyControl::Stop) | Err(_) => return false,
            Ok(KeyControl::Pause) => {}
        }
    }
}

fn decode(ev: &Event) -> Option<Keystroke> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind,
        ..
    }) = ev
    else {
        return None;
    };
    if *kind != KeyEventKind::Press {
        return None;
    }

    match code {
        KeyCode::Esc => Some(Keystroke::Escape),
        KeyCode::Enter => Some(Keystroke::Enter),
        // Raw mode disables the usual SIGINT delivery; honor Ctrl-C as a
        // cancellation request anyway
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Keystroke::Escape)
        }
        KeyCode::Char(c) => Some(Keystroke::Char(*c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_decode_command_keys() {
        assert_eq!(decode(&press(KeyCode::Esc)), Some(Keystroke::Escape));
        assert_eq!(decode(&press(KeyCode::Enter)), Some(Keystroke::Enter));
        assert_eq!(
            decode(&press(KeyCode::Char('p'))),
            Some(Keystroke::Char('p'))
        );
        assert_eq!(decode(&press(KeyCode::F(1))), None);
    }

    #[test]
    fn test_ctrl_c_cancels() {
        let ev = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(decode(&ev), Some(Keystroke::Escape));
    }

    #[test]
    fn test_detached_source_preserves_order() {
        let (tx, mut keys) = KeyInputSource::detached();
        tx.send(Keystroke::Char('a')).unwrap();
        tx.send(Keystroke::Enter).unwrap();
        tx.send(Keystroke::Escape).unwrap();

        assert_eq!(keys.poll(), Some(Keystroke::Char('a')));
        assert_eq!(keys.poll(), Some(Keystroke::Enter));
        assert_eq!(keys.poll(), Some(Keystroke::Escape));
        assert_eq!(keys.poll(), None);
    }
}
