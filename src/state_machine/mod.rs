// Cache mode state machine
//
// The mode is a free-standing value: any caller may set any supported mode at
// any time, so there are no guarded transitions and no terminal state.

pub mod states;

pub use states::CacheMode;
