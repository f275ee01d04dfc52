use swinstr::consts::fp::FConst;
use swinstr::modules::builder::FunctionBuilder;
use swinstr::modules::instructions::SwInstr;
use swinstr::modules::instructions::fp::FCmpOp;
use swinstr::modules::operand::{Label, Name, Operand};
use swinstr::modules::terminator::{BranchWeights, Terminator};
use swinstr::modules::{Function, InstructionRef};
use swinstr::types::FType;
use swinstr::utils::Error;

fn double(value: f64) -> Operand {
    FConst::from_f64(FType::Fp64, value).into()
}

/// entry: a = x + 1; call sqrt(x); b = a + x; branch to exit
/// exit:  phi [b, entry]
fn loop_free_function() -> (Function, Name) {
    let mut builder = FunctionBuilder::new("g");
    let x = builder.param(FType::Fp64);
    builder.returns(FType::Fp64);
    let exit = builder.create_block(Some("exit"));

    let a = builder.fadd(FType::Fp64, x, double(1.0));
    builder.call("sqrt", [x.into()], Some(FType::Fp64.into()));
    let b = builder.fadd(FType::Fp64, a, x);
    builder.jump(exit);

    builder.position_at_end(exit);
    let merged = builder.phi(FType::Fp64, [(Label::NIL, b.into())]);
    builder.ret(Some(merged.into()));
    (builder.build(), x)
}

#[test]
fn split_moves_tail_and_retargets_phis() {
    let (mut func, x) = loop_free_function();
    let cond = {
        let name = func.next_available_name();
        func.insert_instruction(
            InstructionRef::new(Label::NIL, 1),
            swinstr::modules::instructions::fp::FCmp {
                dest: name,
                ty: FType::Fp64,
                lhs: x.into(),
                rhs: double(0.0),
                op: FCmpOp::Olt,
            }
            .into(),
        )
        .unwrap();
        name
    };

    let split = func
        .split_block_and_insert_if_then(
            cond.into(),
            InstructionRef::new(Label::NIL, 2),
            Some(BranchWeights::new(1, 2000)),
        )
        .unwrap();

    assert_eq!(split.head, Label::NIL);
    assert_eq!(func.body[&split.head].instructions.len(), 2);
    assert!(func.body[&split.then].instructions.is_empty());
    assert_eq!(func.body[&split.tail].instructions.len(), 2);
    assert!(func.body[&split.tail].instructions[0].is_invoke());

    match &func.body[&split.head].terminator {
        Terminator::CBranch(cbranch) => {
            assert_eq!(cbranch.target_true, split.then);
            assert_eq!(cbranch.target_false, split.tail);
            assert_eq!(cbranch.weights, Some(BranchWeights::new(1, 2000)));
        }
        other => panic!("unexpected terminator {}", other),
    }

    let exit = Label(1);
    let SwInstr::Phi(phi) = &func.body[&exit].instructions[0] else {
        panic!("exit must start with a phi");
    };
    assert_eq!(phi.values[0].0, split.tail);

    func.verify().unwrap();
}

#[test]
fn relocate_follows_moved_instructions() {
    let (mut func, _) = loop_free_function();
    let before = InstructionRef::new(Label::NIL, 0);
    let after = InstructionRef::new(Label::NIL, 2);
    let split = func
        .split_block_and_insert_if_then(
            FConst::from_f64(FType::Fp64, 0.0).into(),
            InstructionRef::new(Label::NIL, 1),
            None,
        )
        .unwrap();

    assert_eq!(split.relocate(before), before);
    assert_eq!(split.relocate(after), InstructionRef::new(split.tail, 1));
    assert!(matches!(
        func.instruction(split.relocate(after)),
        Some(SwInstr::FAdd(_))
    ));
}

#[test]
fn cannot_split_between_phis() {
    let mut builder = FunctionBuilder::new("phis");
    let x = builder.param(FType::Fp32);
    let body = builder.create_block(None);
    builder.jump(body);
    builder.position_at_end(body);
    builder.phi(FType::Fp32, [(Label::NIL, x.into())]);
    builder.phi(FType::Fp32, [(Label::NIL, x.into())]);
    builder.ret(None);
    let mut func = builder.build();

    let err = func
        .split_block_and_insert_if_then(x.into(), InstructionRef::new(body, 1), None)
        .unwrap_err();
    assert_eq!(err, Error::InvalidSplitPoint { block: body, index: 1 });

    let err = func
        .split_block_and_insert_if_then(x.into(), InstructionRef::new(body, 9), None)
        .unwrap_err();
    assert!(matches!(err, Error::InstructionOutOfBounds { .. }));
}

#[test]
fn verify_reports_broken_functions() {
    let (mut func, _) = loop_free_function();
    func.body.remove(&Label::NIL);
    assert_eq!(func.verify(), Err(Error::MissingEntryBlock));

    let (mut func, _) = loop_free_function();
    func.body.get_mut(&Label(1)).unwrap().terminator = Terminator::Jump(
        swinstr::modules::terminator::Jump { target: Label(7) },
    );
    assert!(matches!(
        func.check_cfg(),
        Err(Error::UndefinedBasicBlock { label: Label(7), .. })
    ));

    let (mut func, _) = loop_free_function();
    func.remove_instruction(InstructionRef::new(Label::NIL, 0)).unwrap();
    assert!(matches!(
        func.check_ssa(),
        Err(Error::UndefinedSSAName { .. })
    ));
}

#[test]
fn use_queries() {
    let (func, x) = loop_free_function();
    let call = func.instruction(InstructionRef::new(Label::NIL, 1)).unwrap();
    let call_dest = call.try_as_invoke_ref().unwrap().dest.unwrap();

    assert!(!func.has_uses(call_dest));
    assert_eq!(func.use_count(x), 3);
    assert_eq!(func.value_type(&x.into()), Some(FType::Fp64.into()));
    assert_eq!(func.value_type(&double(2.0)), Some(FType::Fp64.into()));
    assert!(func.constant_fp(&double(2.0)).is_some());
    assert!(func.constant_fp(&x.into()).is_none());
    assert_eq!(func.int_to_fp_source(&x.into()), None);
}

#[test]
fn display_contains_weights_and_names() {
    let (mut func, _) = loop_free_function();
    let split = func
        .split_block_and_insert_if_then(
            double(0.0),
            InstructionRef::new(Label::NIL, 1),
            Some(BranchWeights::new(1, 2000)),
        )
        .unwrap();
    func.body.get_mut(&split.then).unwrap().name = Some("cdce.call".into());

    let text = func.to_string();
    assert!(text.starts_with("define double @g(double %0)"));
    assert!(text.contains("!weights(1, 2000)"));
    assert!(text.contains("; cdce.call"));
    assert!(text.contains("call double @sqrt(%0)"));
    assert!(text.contains("%1 = fadd double %0, "));
}
