use super::input::{InputBuffer, InputRouter, Point};
use super::scheduler::{TaskHandle, TimerEvent, TimerScheduler};
use super::state::{Action, Notice, SessionState};
use super::view::{RendererBox, ScreenView};
use crate::config::AtmConfig;
use crate::domain::account::{Account, Balance};
use crate::domain::card::{Card, CardIssuer, CardRequest};
use crate::domain::entity::Entity;
use crate::domain::instrument::dispense;
use crate::domain::ports::{ClockBox, IdGeneratorBox, ReceiptExporterBox};
use crate::domain::receipt::ReceiptRecord;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::error::{AtmError, GuardViolation, Result, ValidationError};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::time::Duration;

/// Length of the receipt number printed on exported receipts.
const RECEIPT_NUMBER_LEN: usize = 9;

type Step = std::result::Result<SessionState, GuardViolation>;

/// The card and account bound for the lifetime of one session.
#[derive(Debug)]
struct BoundSession {
    card: Card,
    account: Account,
}

/// Drives one ATM session from card insertion to ejection.
///
/// `SessionController` owns every collaborator it needs; nothing is shared
/// globally. All transitions happen on `apply` (or `handle_pointer`) and on
/// timer events released by `advance`, so at most one mutation is ever in
/// flight. Guard violations never escape as failures: the controller stays in
/// place, records a notice and returns the violation to the caller.
pub struct SessionController {
    config: AtmConfig,
    renderer: RendererBox,
    exporter: ReceiptExporterBox,
    ids: IdGeneratorBox,
    clock: ClockBox,
    scheduler: TimerScheduler,
    router: InputRouter,
    state: SessionState,
    buffer: InputBuffer,
    session: Option<BoundSession>,
    selected: Option<TransactionKind>,
    receipt_requested: Option<bool>,
    last_amount: Option<Decimal>,
    pending_receipt: Option<ReceiptRecord>,
    notice: Option<Notice>,
    timer: Option<TaskHandle>,
    closed: Option<Account>,
}

impl SessionController {
    /// Creates a controller in the `welcome` state and draws the first frame.
    ///
    /// # Arguments
    ///
    /// * `config` - Limits, delays and defaults. Validated here.
    /// * `renderer` - Draws every frame and supplies its hit-regions.
    /// * `exporter` - Receives receipt records when the visitor asks for one.
    /// * `ids` - Source of entity ids and reference codes.
    /// * `clock` - Source of timestamps.
    pub fn new(
        config: AtmConfig,
        renderer: RendererBox,
        exporter: ReceiptExporterBox,
        ids: IdGeneratorBox,
        clock: ClockBox,
    ) -> Result<Self> {
        config.validate()?;
        let mut controller = Self {
            config,
            renderer,
            exporter,
            ids,
            clock,
            scheduler: TimerScheduler::new(),
            router: InputRouter::new(),
            state: SessionState::Welcome,
            buffer: InputBuffer::default(),
            session: None,
            selected: None,
            receipt_requested: None,
            last_amount: None,
            pending_receipt: None,
            notice: None,
            timer: None,
            closed: None,
        };
        controller.redraw();
        Ok(controller)
    }

    /// Issues a card with the configured default PIN.
    pub fn issue_card(&mut self, request: &CardRequest) -> std::result::Result<Card, ValidationError> {
        let issuer = CardIssuer::new(&self.config.default_pin, &self.config.currency.code);
        let card = issuer.issue(request, self.ids.as_mut(), self.clock.as_ref())?;
        info!("Issued card {} for {}", card.card_id(), card.owner_name());
        Ok(card)
    }

    /// Binds a card and opens its account. The state stays where it is.
    pub fn insert_card(&mut self, card: Card) -> Result<()> {
        if self.session.is_some() {
            let violation = GuardViolation::CardAlreadyInserted;
            warn!("{violation}");
            self.notice = Some(Notice::Rejected(violation.clone()));
            self.redraw();
            return Err(violation.into());
        }

        let entity = Entity::new(self.ids.as_mut(), self.clock.as_ref());
        let mut account = Account::open(
            entity,
            card.owner_name(),
            card.currency(),
            self.config.initial_balance,
        )?;
        if !account.set_pin(card.pin()) {
            return Err(AtmError::LedgerError(format!(
                "Card {} carries a malformed PIN",
                card.card_id()
            )));
        }
        info!(
            "Card {} inserted, account {} opened with balance {}",
            card.card_id(),
            account.entity.id,
            account.balance()
        );

        self.session = Some(BoundSession { card, account });
        self.notice = None;
        self.redraw();
        Ok(())
    }

    /// Unbinds card and account, cancels pending timers and returns to `welcome`.
    pub fn eject(&mut self) {
        self.reset();
        self.redraw();
    }

    fn reset(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        if cancelled > 0 {
            debug!("Cancelled {cancelled} pending timer(s) on eject");
        }
        self.timer = None;

        if let Some(session) = self.session.take() {
            info!("Card {} ejected", session.card.card_id());
            self.closed = Some(session.account);
        }
        self.selected = None;
        self.receipt_requested = None;
        self.last_amount = None;
        self.pending_receipt = None;
        self.enter(SessionState::Welcome);
    }

    /// Resolves a pointer event against the current layout and applies it.
    ///
    /// Points outside every region, and regions with no meaning in the
    /// current state, are ignored.
    pub fn handle_pointer(&mut self, point: Point) -> Step {
        let Some(key) = self.router.resolve(point) else {
            debug!("No region at ({}, {})", point.x, point.y);
            return Ok(self.state);
        };
        match self.state.action_for(key) {
            Some(action) => self.apply(action),
            None => {
                debug!("{key:?} has no action in {}", self.state);
                Ok(self.state)
            }
        }
    }

    /// Applies a logical action to the current state.
    pub fn apply(&mut self, action: Action) -> Step {
        self.notice = None;
        let result = self.transition(action);
        if let Err(violation) = &result {
            warn!("{} rejected in {}: {violation}", action_name(action), self.state);
            self.notice = Some(Notice::Rejected(violation.clone()));
        }
        self.redraw();
        result
    }

    /// Advances the virtual clock, firing every timer that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(event) = self.scheduler.pop_due(until) {
            self.on_timer(event);
        }
        self.scheduler.settle(until);
    }

    fn transition(&mut self, action: Action) -> Step {
        use SessionState::*;

        match (self.state, action) {
            (Welcome, Action::Confirm) => {
                if self.session.is_none() {
                    return Err(GuardViolation::NoCardInserted);
                }
                self.enter(PinEntry);
            }
            (Welcome, Action::Help) => self.notice = Some(Notice::Help),
            (PinEntry | AmountEntry, Action::Digit(digit)) => {
                if !self.buffer.push_digit(digit) {
                    debug!("Input buffer full in {}", self.state);
                }
            }
            (PinEntry | AmountEntry, Action::Backspace) => self.buffer.backspace(),
            (PinEntry | AmountEntry, Action::Clear) => self.buffer.clear(),
            (PinEntry, Action::Confirm) => {
                let matches = self
                    .session
                    .as_ref()
                    .is_some_and(|session| session.account.verify_pin(self.buffer.as_str()));
                if !matches {
                    self.buffer.clear();
                    return Err(GuardViolation::PinMismatch);
                }
                self.enter(TransactionType);
            }
            (PinEntry | TransactionType, Action::Cancel) => self.reset(),
            (TransactionType, Action::ChooseDeposit) => {
                self.selected = Some(TransactionKind::Deposit);
                self.enter(AmountEntry);
            }
            (TransactionType, Action::ChooseWithdraw) => {
                self.selected = Some(TransactionKind::Withdrawal);
                self.enter(AmountEntry);
            }
            (AmountEntry, Action::Confirm) => {
                self.commit()?;
                self.enter(ReceiptChoice);
            }
            (AmountEntry, Action::Cancel) => {
                self.selected = None;
                self.enter(TransactionType);
            }
            (ReceiptChoice, Action::ReceiptYes | Action::ReceiptNo) => {
                self.receipt_requested = Some(action == Action::ReceiptYes);
                self.enter(Processing);
                self.timer = Some(
                    self.scheduler
                        .schedule(self.config.processing_delay(), TimerEvent::ProcessingComplete),
                );
            }
            (ReceiptChoice, Action::Cancel) => {
                if let Some(receipt) = self.pending_receipt.take() {
                    info!(
                        "Transaction {} stays committed after cancel",
                        receipt.transaction.reference
                    );
                }
                self.selected = None;
                self.enter(TransactionType);
            }
            (ThankYou, Action::Confirm | Action::Cancel) => self.reset(),
            (state, action) => debug!("Ignoring {} in {state}", action_name(action)),
        }
        Ok(self.state)
    }

    /// Validates the buffered amount and applies it to the ledger.
    fn commit(&mut self) -> std::result::Result<(), GuardViolation> {
        let Some(kind) = self.selected else {
            return Err(GuardViolation::NoCardInserted);
        };
        let amount = parse_amount(self.buffer.as_str());
        self.config.limits.check(kind, amount)?;

        let Some(session) = self.session.as_mut() else {
            return Err(GuardViolation::NoCardInserted);
        };
        let account = &mut session.account;
        let previous_balance = account.balance();
        if kind == TransactionKind::Withdrawal && Balance::new(amount) > previous_balance {
            return Err(GuardViolation::InsufficientFunds {
                requested: amount,
                available: previous_balance.value(),
            });
        }

        let ledger = match kind {
            TransactionKind::Deposit => {
                account.deposit(amount, self.ids.as_mut(), self.clock.as_ref())
            }
            TransactionKind::Withdrawal => {
                account.withdraw(amount, self.ids.as_mut(), self.clock.as_ref())
            }
        };
        let transaction: Transaction = match ledger {
            Ok(tx) => tx.clone(),
            Err(e) => {
                warn!("Ledger refused {kind} of {amount}: {e}");
                return Err(GuardViolation::InsufficientFunds {
                    requested: amount,
                    available: previous_balance.value(),
                });
            }
        };
        let new_balance = account.balance();
        let currency = account.currency.clone();
        info!(
            "{kind} of {amount} committed as {} (balance {previous_balance} -> {new_balance})",
            transaction.reference
        );

        let dispensed = match kind {
            TransactionKind::Withdrawal => {
                dispense(amount, &currency, self.ids.as_mut(), self.clock.as_ref())
            }
            TransactionKind::Deposit => Vec::new(),
        };
        self.pending_receipt = Some(ReceiptRecord {
            receipt_number: self.ids.code(RECEIPT_NUMBER_LEN),
            location: self.config.location.clone(),
            transaction,
            previous_balance,
            new_balance,
            dispensed,
        });
        self.last_amount = Some(amount);
        Ok(())
    }

    fn on_timer(&mut self, event: TimerEvent) {
        self.timer = None;
        match (self.state, event) {
            (SessionState::Processing, TimerEvent::ProcessingComplete) => {
                let receipt = self.pending_receipt.take();
                if self.receipt_requested == Some(true)
                    && let Some(receipt) = receipt
                {
                    match self.exporter.export(&receipt) {
                        Ok(()) => info!("Receipt {} exported", receipt.receipt_number),
                        Err(e) => warn!("Receipt {} not exported: {e}", receipt.receipt_number),
                    }
                }
                self.enter(SessionState::ThankYou);
                self.timer = Some(
                    self.scheduler
                        .schedule(self.config.auto_eject_delay(), TimerEvent::AutoEject),
                );
                self.redraw();
            }
            (SessionState::ThankYou, TimerEvent::AutoEject) => self.eject(),
            (state, event) => debug!("Stale {event:?} in {state}"),
        }
    }

    /// Switches state and resets the input buffer for it.
    fn enter(&mut self, state: SessionState) {
        if self.state != state {
            info!("{} -> {}", self.state, state);
        }
        self.state = state;
        self.buffer = InputBuffer::with_capacity(state.input_capacity());
    }

    fn redraw(&mut self) {
        let session = self.session.as_ref();
        let view = ScreenView {
            state: self.state,
            input: self.buffer.as_str(),
            labels: self.state.labels(),
            card: session.map(|s| &s.card),
            balance: session.map(|s| s.account.balance()),
            notice: self.notice.as_ref(),
            selected: self.selected,
            receipt_requested: self.receipt_requested,
            last_amount: self.last_amount,
            limits: &self.config.limits,
            currency: &self.config.currency,
            screen: self.config.screen,
        };
        let regions = self.renderer.render(&view);
        self.router.set_layout(regions);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn input(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn labels(&self) -> [&'static str; 3] {
        self.state.labels()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn config(&self) -> &AtmConfig {
        &self.config
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn is_card_inserted(&self) -> bool {
        self.session.is_some()
    }

    pub fn card(&self) -> Option<&Card> {
        self.session.as_ref().map(|s| &s.card)
    }

    pub fn account(&self) -> Option<&Account> {
        self.session.as_ref().map(|s| &s.account)
    }

    pub fn balance(&self) -> Option<Balance> {
        self.account().map(Account::balance)
    }

    pub fn history(&self) -> &[Transaction] {
        self.account().map(Account::history).unwrap_or_default()
    }

    pub fn selected_kind(&self) -> Option<TransactionKind> {
        self.selected
    }

    pub fn receipt_requested(&self) -> Option<bool> {
        self.receipt_requested
    }

    pub fn last_amount(&self) -> Option<Decimal> {
        self.last_amount
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// Time left before the next timed transition, if one is scheduled.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.scheduler.time_until_next()
    }

    /// The account unbound by the last eject. Returned once.
    pub fn take_closed_account(&mut self) -> Option<Account> {
        self.closed.take()
    }
}

/// Reads the buffer as a whole amount. Anything unparsable counts as zero.
fn parse_amount(input: &str) -> Decimal {
    input.parse::<u64>().map(Decimal::from).unwrap_or(Decimal::ZERO)
}

fn action_name(action: Action) -> &'static str {
    match action {
        Action::Digit(_) => "digit",
        Action::Backspace => "backspace",
        Action::Confirm => "confirm",
        Action::Clear => "clear",
        Action::Cancel => "cancel",
        Action::Help => "help",
        Action::ChooseDeposit => "chooseDeposit",
        Action::ChooseWithdraw => "chooseWithdraw",
        Action::ReceiptYes => "receiptYes",
        Action::ReceiptNo => "receiptNo",
    }
}
