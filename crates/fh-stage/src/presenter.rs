//! Presenter: the seam to the rendering layer
//!
//! Sessions push notices into a `Presenter`; whatever draws coins, wheels or
//! confetti lives behind it.

use crate::event::NoticeEvent;

/// Receiver of notices. Never queried back by the core.
pub trait Presenter {
    fn present(&mut self, event: &NoticeEvent);
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn present(&mut self, event: &NoticeEvent) {
        (**self).present(event);
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&mut self, event: &NoticeEvent) {
        (**self).present(event);
    }
}

/// Presenter that drops everything (headless play, simulations)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _event: &NoticeEvent) {}
}

/// Presenter that forwards every notice to a closure
pub struct FnPresenter<F>(pub F);

impl<F: FnMut(&NoticeEvent)> Presenter for FnPresenter<F> {
    fn present(&mut self, event: &NoticeEvent) {
        (self.0)(event)
    }
}

/// Presenter that keeps every event it was given (tests, replays)
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub events: Vec<NoticeEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type names in delivery order
    pub fn type_names(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.type_name()).collect()
    }

    pub fn count(&self, type_name: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .count()
    }

    /// Last balance any wallet notice reported
    pub fn last_balance(&self) -> Option<u64> {
        self.events.iter().rev().find_map(|e| e.notice.balance())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, event: &NoticeEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Notice;

    #[test]
    fn test_recording_presenter() {
        let mut rec = RecordingPresenter::new();
        rec.present(&NoticeEvent::new(Notice::BalanceChanged { balance: 900 }, 0.0));
        rec.present(&NoticeEvent::new(Notice::DieLanded { face: 4 }, 1550.0));
        rec.present(&NoticeEvent::new(Notice::BalanceChanged { balance: 1500 }, 2050.0));

        assert_eq!(rec.count("balance_changed"), 2);
        assert_eq!(rec.last_balance(), Some(1500));
        assert_eq!(
            rec.type_names(),
            vec!["balance_changed", "die_landed", "balance_changed"]
        );
    }

    #[test]
    fn test_fn_presenter_forwards() {
        let mut seen = Vec::new();
        {
            let mut presenter = FnPresenter(|e: &NoticeEvent| seen.push(e.type_name()));
            presenter.present(&NoticeEvent::new(Notice::DieLanded { face: 2 }, 10.0));
            presenter.present(&NoticeEvent::new(Notice::BalanceChanged { balance: 1 }, 20.0));
        }
        assert_eq!(seen, vec!["die_landed", "balance_changed"]);
    }
}
