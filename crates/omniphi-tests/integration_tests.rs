// End-to-end scenarios for the governance timelock: vote-end hook →
// end-of-block interception → delayed execution, with the host governance
// executor running after the timelock in every block.

use omniphi_tests::test_utils::{
    addr, gov_authority, guardian, raw_msgs, TestChain,
};
use omniphi_timelock::{
    ExecuteOutcome, GovProposalStatus, GovernanceHooks, MsgCancel, MsgEmergencyExecute,
    MsgExecute, MsgUpdateGuardian, OperationStatus, PageRequest, TimelockError, TimelockEvent,
};

#[test]
fn test_normal_path_queue_then_execute() {
    let chain = TestChain::new();

    // t=0: proposal #7 passes its vote; hook marks it, driver intercepts it
    chain.pass_proposal(7, &[1, 2]);
    let events = chain.end_block(1, 0);

    assert!(events.iter().any(|e| matches!(
        e,
        TimelockEvent::OperationQueued { id: 1, proposal_id: 7, executable_at_unix: 86_400, expires_at_unix: 691_200 }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, TimelockEvent::ProposalMarkedForTimelock { proposal_id: 7 })));

    let op = chain.module.query_operation(1).unwrap();
    assert_eq!(op.proposal_id, 7);
    assert_eq!(op.executable_at_unix, 86_400);
    assert_eq!(op.expires_at_unix, 691_200);
    assert_eq!(op.initiator, gov_authority());

    // before the delay elapses, execution is refused
    let err = chain
        .module
        .handle_execute(&chain.ctx(2, 86_399), MsgExecute { operation_id: 1 })
        .unwrap_err();
    assert!(matches!(err, TimelockError::NotYetExecutable { .. }));

    // t=86_400: anyone may execute
    let outcome = chain
        .module
        .handle_execute(&chain.ctx(3, 86_400), MsgExecute { operation_id: 1 })
        .unwrap();
    assert_eq!(outcome, ExecuteOutcome::Completed);
    assert_eq!(chain.dispatcher.dispatched_markers(), vec![1, 2]);

    let op = chain.module.query_operation(1).unwrap();
    assert_eq!(op.status, OperationStatus::Executed);
    assert_eq!(op.executed_at_unix, Some(86_400));

    // the host proposal still reads Failed; the host executor never ran it
    assert_eq!(chain.gov.get(7).unwrap().status, GovProposalStatus::Failed);
    assert!(chain.gov.executed().is_empty());
}

#[test]
fn test_cancel_blocks_later_execution() {
    let chain = TestChain::new();
    chain.pass_proposal(7, &[1]);
    chain.end_block(1, 0);

    // t=10: guardian cancels
    chain
        .module
        .handle_cancel(MsgCancel { operation_id: 1, reason: "exploit found".into() }, guardian())
        .unwrap();

    let op = chain.module.query_operation(1).unwrap();
    assert_eq!(op.status, OperationStatus::Cancelled);
    assert_eq!(op.cancel_reason.as_deref(), Some("exploit found"));

    // t=86_400: execution refused
    let err = chain
        .module
        .handle_execute(&chain.ctx(2, 86_400), MsgExecute { operation_id: 1 })
        .unwrap_err();
    assert!(matches!(
        err,
        TimelockError::InvalidState { status: OperationStatus::Cancelled, .. }
    ));
    assert!(chain.dispatcher.dispatched().is_empty());
}

#[test]
fn test_emergency_execute_shortens_delay() {
    let chain = TestChain::new();
    chain.pass_proposal(9, &[3]);
    chain.end_block(1, 0);

    // t=100: guardian fast-tracks
    let msg = MsgEmergencyExecute { operation_id: 1, justification: "security fix".into() };
    let op = chain
        .module
        .handle_emergency_execute(&chain.ctx(2, 100), msg, guardian())
        .unwrap();
    assert_eq!(op.executable_at_unix, 3_700);
    assert_eq!(op.expires_at_unix, 608_500);
    assert_eq!(op.status, OperationStatus::Queued);

    let events = chain.module.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TimelockEvent::OperationEmergencyExecuteSet { id: 1, new_executable_at_unix: 3_700, .. }
    )));

    // still a delay: t=3_699 refused, t=3_700 succeeds
    assert!(chain
        .module
        .handle_execute(&chain.ctx(3, 3_699), MsgExecute { operation_id: 1 })
        .is_err());
    let outcome = chain
        .module
        .handle_execute(&chain.ctx(4, 3_700), MsgExecute { operation_id: 1 })
        .unwrap();
    assert_eq!(outcome, ExecuteOutcome::Completed);
}

#[test]
fn test_partial_dispatch_failure_keeps_earlier_effects() {
    let chain = TestChain::new();
    chain.pass_proposal(5, &[10, 11, 12]);
    chain.end_block(1, 0);

    chain.dispatcher.fail_on_body(11);
    let outcome = chain
        .module
        .handle_execute(&chain.ctx(2, 86_400), MsgExecute { operation_id: 1 })
        .unwrap();
    assert_eq!(
        outcome,
        ExecuteOutcome::DispatchFailed {
            failing_message_index: 1,
            error: "handler rejected message".into()
        }
    );

    // message 0 applied; 1 failed; 2 skipped
    assert_eq!(chain.dispatcher.dispatched_markers(), vec![10]);

    let op = chain.module.query_operation(1).unwrap();
    assert_eq!(op.status, OperationStatus::Failed);

    let events = chain.module.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TimelockEvent::OperationFailed { id: 1, failing_message_index: 1, .. }
    )));
}

#[test]
fn test_unexecuted_operation_expires_in_sweep() {
    let chain = TestChain::new();
    chain.pass_proposal(4, &[1]);
    chain.end_block(1, 0);

    // window still open at the boundary
    chain.end_block(2, 691_200);
    assert_eq!(chain.module.query_operation(1).unwrap().status, OperationStatus::Queued);

    // one second past expiry the sweep transitions it
    let events = chain.end_block(3, 691_201);
    assert!(events.iter().any(|e| matches!(e, TimelockEvent::OperationExpired { id: 1 })));

    let op = chain.module.query_operation(1).unwrap();
    assert_eq!(op.status, OperationStatus::Expired);

    // subsequent execution reports Expired
    let err = chain
        .module
        .handle_execute(&chain.ctx(4, 691_300), MsgExecute { operation_id: 1 })
        .unwrap_err();
    assert!(matches!(err, TimelockError::Expired { .. }));
}

#[test]
fn test_guardian_rotation_is_self_timelocked() {
    let chain = TestChain::new();
    let incoming = addr(0xC3);

    // direct rotation is rejected while a guardian exists
    let direct = MsgUpdateGuardian {
        authority: gov_authority().to_string(),
        new_guardian: incoming.to_string(),
    };
    assert!(chain.module.handle_update_guardian(direct, gov_authority()).is_err());

    // the rotation travels as a proposal through the queue
    let rotation = MsgUpdateGuardian {
        authority: gov_authority().to_string(),
        new_guardian: incoming.to_string(),
    };
    let wire = rotation.to_chain_msg().unwrap().encode().unwrap();
    chain.pass_proposal_raw(12, vec![wire]);
    chain.end_block(1, 0);

    // until execution the outgoing guardian keeps full powers: it could
    // cancel the hostile replacement (not done here)
    assert_eq!(chain.module.guardian().unwrap(), Some(guardian()));

    chain
        .module
        .handle_execute(&chain.ctx(2, 86_400), MsgExecute { operation_id: 1 })
        .unwrap();
    assert_eq!(chain.module.guardian().unwrap(), Some(incoming));

    // emergency powers now belong to the incoming guardian
    chain.pass_proposal(13, &[1]);
    chain.end_block(3, 86_400);
    let op_id = 2;
    let msg = MsgEmergencyExecute { operation_id: op_id, justification: "handover".into() };
    assert!(chain
        .module
        .handle_emergency_execute(&chain.ctx(4, 86_500), msg.clone(), guardian())
        .is_err());
    chain
        .module
        .handle_emergency_execute(&chain.ctx(4, 86_500), msg, incoming)
        .unwrap();
}

#[test]
fn test_outgoing_guardian_can_cancel_hostile_rotation() {
    let chain = TestChain::new();
    let hostile = addr(0x66);

    let rotation = MsgUpdateGuardian {
        authority: gov_authority().to_string(),
        new_guardian: hostile.to_string(),
    };
    let wire = rotation.to_chain_msg().unwrap().encode().unwrap();
    chain.pass_proposal_raw(20, vec![wire]);
    chain.end_block(1, 0);

    chain
        .module
        .handle_cancel(
            MsgCancel { operation_id: 1, reason: "hostile takeover".into() },
            guardian(),
        )
        .unwrap();

    assert!(chain
        .module
        .handle_execute(&chain.ctx(2, 86_400), MsgExecute { operation_id: 1 })
        .is_err());
    assert_eq!(chain.module.guardian().unwrap(), Some(guardian()));
}

#[test]
fn test_duplicate_hook_delivery_is_idempotent() {
    let chain = TestChain::new();
    chain.pass_proposal(7, &[1]);
    // host delivers the hook twice
    chain.module.after_proposal_voting_period_ended(7);
    chain.end_block(1, 0);

    assert_eq!(chain.module.query_queued(PageRequest::default()).unwrap().len(), 1);
}

#[test]
fn test_rejected_proposals_flow_past_untouched() {
    let chain = TestChain::new();
    chain.gov.insert(omniphi_timelock::GovProposal {
        id: 3,
        status: GovProposalStatus::Rejected,
        messages: raw_msgs(&[1]),
    });
    chain.module.after_proposal_voting_period_ended(3);
    chain.end_block(1, 0);

    assert!(chain.module.query_queued(PageRequest::default()).unwrap().is_empty());
    assert_eq!(chain.gov.get(3).unwrap().status, GovProposalStatus::Rejected);
}

#[test]
fn test_multiple_proposals_intercepted_in_id_order() {
    let chain = TestChain::new();
    for pid in [31u64, 11, 21] {
        chain.pass_proposal(pid, &[pid as u8]);
    }
    chain.end_block(1, 0);

    // ascending proposal order determines operation ids
    let queued = chain.module.query_queued(PageRequest::default()).unwrap();
    let pairs: Vec<(u64, u64)> = queued.iter().map(|op| (op.id, op.proposal_id)).collect();
    assert_eq!(pairs, vec![(1, 11), (2, 21), (3, 31)]);

    // every queued proposal is neutralized on the host side
    for pid in [11u64, 21, 31] {
        assert_eq!(chain.gov.get(pid).unwrap().status, GovProposalStatus::Failed);
    }
}

#[test]
fn test_genesis_round_trip_preserves_operations() {
    let chain = TestChain::new();
    chain.pass_proposal(7, &[1]);
    chain.pass_proposal(8, &[2]);
    chain.end_block(1, 0);
    chain
        .module
        .handle_cancel(MsgCancel { operation_id: 2, reason: "drop".into() }, guardian())
        .unwrap();

    let exported = chain.module.export_genesis().unwrap();
    let json = serde_json::to_string_pretty(&exported).unwrap();
    let imported: omniphi_timelock::GenesisState = serde_json::from_str(&json).unwrap();

    let fresh = TestChain::without_guardian();
    fresh.module.init_genesis(&imported).unwrap();

    assert_eq!(fresh.module.query_operation(1).unwrap().status, OperationStatus::Queued);
    assert_eq!(fresh.module.query_operation(2).unwrap().status, OperationStatus::Cancelled);
    assert_eq!(fresh.module.guardian().unwrap(), Some(guardian()));

    // the restored queue keeps working
    let outcome = fresh
        .module
        .handle_execute(&fresh.ctx(1, 86_400), MsgExecute { operation_id: 1 })
        .unwrap();
    assert_eq!(outcome, ExecuteOutcome::Completed);
}

#[test]
fn test_queued_and_executable_queries_across_lifecycle() {
    let chain = TestChain::new();
    chain.pass_proposal(7, &[1]);
    chain.pass_proposal(8, &[2]);
    chain.end_block(1, 0);

    assert_eq!(chain.module.query_queued(PageRequest::default()).unwrap().len(), 2);
    assert!(chain
        .module
        .query_executable(&chain.ctx(2, 100), PageRequest::default())
        .unwrap()
        .is_empty());

    let executable = chain
        .module
        .query_executable(&chain.ctx(3, 86_400), PageRequest::default())
        .unwrap();
    assert_eq!(executable.len(), 2);

    chain
        .module
        .handle_execute(&chain.ctx(4, 86_400), MsgExecute { operation_id: 1 })
        .unwrap();
    let executable = chain
        .module
        .query_executable(&chain.ctx(5, 86_400), PageRequest::default())
        .unwrap();
    let ids: Vec<u64> = executable.iter().map(|op| op.id).collect();
    assert_eq!(ids, vec![2]);
}
