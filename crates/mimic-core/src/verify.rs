// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only views over a member's call log.

use crate::call::{CallRecord, CallSummary};
use crate::error::MockError;
use crate::mock::Member;

/// Verification view over one member's recorded calls.
pub fn that(member: Member<'_>) -> VerificationView<'_> {
    VerificationView { member }
}

/// Same view as [`that`], for capturing arguments rather than asserting.
pub fn spy(member: Member<'_>) -> VerificationView<'_> {
    that(member)
}

/// Returned by [`that`] and [`spy`].
///
/// Every query reads the live log, so a view taken before the calls happen
/// sees them afterwards.
#[derive(Debug, Clone, Copy)]
pub struct VerificationView<'a> {
    member: Member<'a>,
}

impl VerificationView<'_> {
    /// Number of recorded calls.
    pub fn num_calls(&self) -> usize {
        self.member.with_log(<[CallRecord]>::len)
    }

    /// At least one call was recorded.
    pub fn was_called(&self) -> bool {
        self.num_calls() > 0
    }

    /// Fails with [`MockError::UnexpectedCalls`] if any call was recorded.
    pub fn was_not_called(&self) -> Result<(), MockError> {
        match self.num_calls() {
            0 => Ok(()),
            num_calls => Err(MockError::UnexpectedCalls {
                member: self.member.label().to_owned(),
                num_calls,
            }),
        }
    }

    /// The most recent call.
    pub fn last_call(&self) -> Result<CallSummary, MockError> {
        self.member
            .with_log(|log| log.last().map(CallRecord::summary))
            .ok_or_else(|| MockError::NoCallsRecorded {
                member: self.member.label().to_owned(),
            })
    }

    /// The call at zero-based position `index`.
    pub fn nth_call(&self, index: usize) -> Result<CallSummary, MockError> {
        self.member.with_log(|log| {
            log.get(index)
                .map(CallRecord::summary)
                .ok_or_else(|| MockError::IndexOutOfRange {
                    member: self.member.label().to_owned(),
                    index,
                    num_calls: log.len(),
                })
        })
    }

    /// Every recorded call, oldest first.
    pub fn all_calls(&self) -> Vec<CallRecord> {
        self.member.with_log(<[CallRecord]>::to_vec)
    }
}
