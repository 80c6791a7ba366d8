mod amount;
mod events;
mod frame;
mod items;
mod schedule;
mod triggers;
pub(crate) mod wire;

pub use amount::{AmountFreq, FlowDelta, PercentageBasis};
pub use events::{EventItem, TargetStateAction};
pub use frame::{ItemState, SimEvent, SimFrame};
pub use items::{FinancialItem, ItemType, SelfTriggerOutcome, ShareDetails};
pub use schedule::{AmountSchedule, Frequency, Weekday};
pub use triggers::{
    CompareOp, MatchKind, PeerState, TagPredicate, TriggerConditions, TriggerContext, ValueTrigger,
};
