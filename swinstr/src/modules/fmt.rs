//! Pretty-print helpers for instructions, basic blocks and functions.
use crate::modules::{
    BasicBlock, Function, FunctionAttributes,
    instructions::{Instruction, SwInstr},
    operand::Operand,
};

/// Comma separated list of call arguments.
struct CallArgs<'a>(&'a [Operand]);

impl std::fmt::Display for CallArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for SwInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(dest) = self.destination() {
            write!(f, "{} = ", dest)?;
        }

        let opname = self.op().opname();
        match self {
            SwInstr::FAdd(instr) => {
                write!(f, "{} {} {}, {}", opname, instr.ty, instr.lhs, instr.rhs)
            }
            SwInstr::FSub(instr) => {
                write!(f, "{} {} {}, {}", opname, instr.ty, instr.lhs, instr.rhs)
            }
            SwInstr::FMul(instr) => {
                write!(f, "{} {} {}, {}", opname, instr.ty, instr.lhs, instr.rhs)
            }
            SwInstr::FDiv(instr) => {
                write!(f, "{} {} {}, {}", opname, instr.ty, instr.lhs, instr.rhs)
            }
            SwInstr::FNeg(instr) => write!(f, "{} {} {}", opname, instr.ty, instr.value),
            SwInstr::FCmp(instr) => write!(
                f,
                "fcmp.{} {} {}, {}",
                instr.op.to_str(),
                instr.ty,
                instr.lhs,
                instr.rhs
            ),
            SwInstr::IOr(instr) => {
                write!(f, "{} {} {}, {}", opname, instr.ty, instr.lhs, instr.rhs)
            }
            SwInstr::Cast(instr) => write!(
                f,
                "{} {} {} to {}",
                instr.op.to_str(),
                instr.from,
                instr.value,
                instr.to
            ),
            SwInstr::Invoke(instr) => {
                write!(f, "call ")?;
                if instr.is_no_builtin() {
                    write!(f, "nobuiltin ")?;
                }
                match instr.ty {
                    Some(ty) => write!(f, "{} ", ty)?,
                    None => write!(f, "void ")?,
                }
                match instr.symbol() {
                    Some(symbol) => write!(f, "@{}", symbol)?,
                    None => {
                        if let Some(ptr) = instr.callee.operand() {
                            write!(f, "{}", ptr)?;
                        }
                    }
                }
                write!(f, "({})", CallArgs(&instr.args))
            }
            SwInstr::Phi(instr) => {
                write!(f, "phi {} ", instr.ty)?;
                for (i, (label, value)) in instr.values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}, {}]", value, label)?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => writeln!(f, "{}: ; {}", self.label, name)?,
            None => writeln!(f, "{}:", self.label)?,
        }
        for instr in &self.instructions {
            writeln!(f, "  {}", instr)?;
        }
        writeln!(f, "  {}", self.terminator)
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "define {} {}(",
            self.return_type
                .map(|ty| ty.to_string())
                .unwrap_or("void".to_string()),
            self.name
                .as_ref()
                .map(|name| format!("@{}", name))
                .unwrap_or(format!("@{}", self.uuid))
        )?;

        for (i, (param_name, param_type)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", param_type, param_name)?;
        }
        write!(f, ")")?;

        if self.attributes.contains(FunctionAttributes::OPTIMIZE_FOR_SIZE) {
            write!(f, " optsize")?;
        }
        if self.attributes.contains(FunctionAttributes::MINIMIZE_SIZE) {
            write!(f, " minsize")?;
        }
        if self.attributes.contains(FunctionAttributes::COLD) {
            write!(f, " cold")?;
        }
        writeln!(f, " {{")?;

        for block in self.body.values() {
            write!(f, "{}", block)?;
        }
        writeln!(f, "}}")
    }
}
