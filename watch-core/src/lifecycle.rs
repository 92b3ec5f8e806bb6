/// Something holding listeners that must be released before it is replaced.
pub trait Detach {
    fn detach(&mut self);
}

/// Owns the chart currently on screen. Installing a new one detaches the
/// old one first, so at most one set of chart listeners is ever live.
#[derive(Debug)]
pub struct ChartSlot<H: Detach> {
    active: Option<H>,
}

impl<H: Detach> Default for ChartSlot<H> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<H: Detach> ChartSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, handle: H) {
        self.clear();
        self.active = Some(handle);
    }

    pub fn clear(&mut self) {
        if let Some(mut old) = self.active.take() {
            old.detach();
        }
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Token handed out when a series request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    id: String,
}

impl LoadTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Last-click-wins ordering for overlapping series requests: only the
/// ticket from the most recent `begin` is current.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    next_seq: u64,
    current: Option<u64>,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, id: impl Into<String>) -> LoadTicket {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.current = Some(seq);
        LoadTicket { seq, id: id.into() }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.current == Some(ticket.seq)
    }
}

/// Run `build`; if it fails, `discard` tears down whatever it left behind.
pub fn build_or_discard<T, E>(
    build: impl FnOnce() -> Result<T, E>,
    discard: impl FnOnce(),
) -> Result<T, E> {
    let built = build();
    if built.is_err() {
        discard();
    }
    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Stand-in for a chart that registers one resize listener.
    struct FakeChart {
        installed: Rc<Cell<i32>>,
        detached: bool,
    }

    impl FakeChart {
        fn install(installed: &Rc<Cell<i32>>) -> Self {
            installed.set(installed.get() + 1);
            Self {
                installed: installed.clone(),
                detached: false,
            }
        }
    }

    impl Detach for FakeChart {
        fn detach(&mut self) {
            if !self.detached {
                self.detached = true;
                self.installed.set(self.installed.get() - 1);
            }
        }
    }

    #[test]
    fn sequential_loads_leave_one_listener() {
        let installed = Rc::new(Cell::new(0));
        let mut slot = ChartSlot::new();
        for _ in 0..10 {
            slot.replace(FakeChart::install(&installed));
            assert_eq!(installed.get(), 1);
        }
        assert!(slot.is_active());
        slot.clear();
        assert_eq!(installed.get(), 0);
        assert!(!slot.is_active());
    }

    #[test]
    fn clearing_an_empty_slot_is_a_no_op() {
        let mut slot: ChartSlot<FakeChart> = ChartSlot::new();
        slot.clear();
        assert!(!slot.is_active());
    }

    #[test]
    fn last_click_wins() {
        let mut seq = LoadSequencer::new();
        let first = seq.begin("1");
        let second = seq.begin("2");
        assert!(!seq.is_current(&first));
        assert!(seq.is_current(&second));
        assert_eq!(second.id(), "2");
    }

    #[test]
    fn reloading_same_id_still_supersedes() {
        let mut seq = LoadSequencer::new();
        let a = seq.begin("1");
        let b = seq.begin("1");
        assert_ne!(a, b);
        assert!(seq.is_current(&b));
        assert!(!seq.is_current(&a));
    }

    #[test]
    fn failed_build_is_discarded() {
        let discarded = Cell::new(0);
        let failed: Result<(), &str> =
            build_or_discard(|| Err("no layout"), || discarded.set(discarded.get() + 1));
        assert_eq!(failed, Err("no layout"));
        assert_eq!(discarded.get(), 1);

        let built = build_or_discard(|| Ok::<_, &str>(7), || discarded.set(discarded.get() + 1));
        assert_eq!(built, Ok(7));
        assert_eq!(discarded.get(), 1);
    }
}
