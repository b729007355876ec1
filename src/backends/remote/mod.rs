// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote plugin invocation over the message bus.

mod address;
mod correlation;
mod dispatcher;

pub use address::RemoteAddress;
pub use correlation::{PendingReplies, ReplySlot, UNCLAIMED_CAPACITY};
pub use dispatcher::RemoteDispatcher;
