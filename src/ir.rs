//! Typed three-address statements consumed by the translator.
//!
//! The IR mirrors a stack-less bytecode representation: operands of
//! operations are [`Immediate`]s (locals or constants), heap accesses occur
//! only as the direct left or right operand of an assignment, and jump
//! targets refer to statements by their label name.
//!
//! Producing this IR from class files is the job of a front end; the types
//! here only fix the shape the translator understands.

use std::fmt;

/// Value types of locals, fields and constants.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Type {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// A class or interface type.
    Ref(String),
    /// An array with the given element type.
    Array(Box<Type>),
    /// The type of the `null` constant.
    Null,
    Void,
}

impl Type {
    /// Integer-like values: everything the JVM computes with as `int` or `long`.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Type::Boolean | Type::Byte | Type::Char | Type::Short | Type::Int | Type::Long
        )
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Ref(_) | Type::Array(_) | Type::Null)
    }

    /// Types whose static fields are tracked as observables.
    pub fn is_tracked_primitive(&self) -> bool {
        matches!(self, Type::Short | Type::Int | Type::Long)
    }

    fn integral_width(&self) -> Option<u32> {
        match self {
            Type::Boolean => Some(1),
            Type::Byte => Some(8),
            Type::Char | Type::Short => Some(16),
            Type::Int => Some(32),
            Type::Long => Some(64),
            _ => None,
        }
    }

    /// Returns `true` if converting a value of type `self` to `target` may
    /// change it: narrowing integral conversions, any conversion between
    /// floating and integral values, and primitive/reference mismatches.
    pub fn narrows_to(&self, target: &Type) -> bool {
        if self.is_reference() && target.is_reference() {
            return false;
        }
        match (self.integral_width(), target.integral_width()) {
            (Some(from), Some(to)) => to < from || (to == from && (*self == Type::Char) != (*target == Type::Char)),
            _ => self != target,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => write!(f, "boolean"),
            Type::Byte => write!(f, "byte"),
            Type::Char => write!(f, "char"),
            Type::Short => write!(f, "short"),
            Type::Int => write!(f, "int"),
            Type::Long => write!(f, "long"),
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::Ref(name) => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Null => write!(f, "null_type"),
            Type::Void => write!(f, "void"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Local {
    pub name: String,
    pub ty: Type,
}

impl Local {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A field declaration or reference.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Field {
    pub class: String,
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
}

impl Field {
    pub fn new(class: impl Into<String>, name: impl Into<String>, ty: Type, is_static: bool) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            ty,
            is_static,
        }
    }

    /// `Class.field`, the observable name of a static field.
    pub fn symbol(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.class, self.ty, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f64),
    Str(String),
    Class(String),
    Null,
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int(_) => Type::Int,
            Constant::Long(_) => Type::Long,
            Constant::Float(_) => Type::Double,
            Constant::Str(_) => Type::Ref("java.lang.String".to_string()),
            Constant::Class(_) => Type::Ref("java.lang.Class".to_string()),
            Constant::Null => Type::Null,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Long(v) => write!(f, "{}L", v),
            Constant::Float(v) => write!(f, "{}", v),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Class(c) => write!(f, "class {:?}", c),
            Constant::Null => write!(f, "null"),
        }
    }
}

/// An operand: a local or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediate {
    Local(Local),
    Constant(Constant),
}

impl Immediate {
    pub fn ty(&self) -> Type {
        match self {
            Immediate::Local(local) => local.ty.clone(),
            Immediate::Constant(c) => c.ty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Immediate::Constant(Constant::Null))
    }

    pub fn as_local(&self) -> Option<&Local> {
        match self {
            Immediate::Local(local) => Some(local),
            Immediate::Constant(_) => None,
        }
    }
}

impl From<Local> for Immediate {
    fn from(local: Local) -> Self {
        Immediate::Local(local)
    }
}

impl From<Constant> for Immediate {
    fn from(c: Constant) -> Self {
        Immediate::Constant(c)
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Local(local) => write!(f, "{}", local),
            Immediate::Constant(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    Cmp,
    Cmpg,
    Cmpl,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Ushr => ">>>",
            BinOp::Cmp => "cmp",
            BinOp::Cmpg => "cmpg",
            BinOp::Cmpl => "cmpl",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CondOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CondOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CondOp::Eq => "==",
            CondOp::Ne => "!=",
            CondOp::Lt => "<",
            CondOp::Le => "<=",
            CondOp::Gt => ">",
            CondOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// `lhs op rhs` of a conditional jump.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub op: CondOp,
    pub lhs: Immediate,
    pub rhs: Immediate,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

/// A resolvable method signature.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
    /// JVM method descriptor, e.g. `(I)I`.
    pub descriptor: String,
}

impl MethodRef {
    pub fn new(class: impl Into<String>, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InvokeKind {
    Static,
    Virtual,
    Special,
    Interface,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoke {
    pub kind: InvokeKind,
    pub method: MethodRef,
    /// The receiver of instance calls.
    pub base: Option<Local>,
    pub args: Vec<Immediate>,
}

impl fmt::Display for Invoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(base) = &self.base {
            write!(f, "{}.", base)?;
        }
        write!(f, "{}(", self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Assignment targets.
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    Local(Local),
    StaticField(Field),
    InstanceField { base: Local, field: Field },
    ArrayElem { base: Local, index: Immediate },
}

impl fmt::Display for LValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LValue::Local(local) => write!(f, "{}", local),
            LValue::StaticField(field) => write!(f, "{}", field),
            LValue::InstanceField { base, field } => write!(f, "{}.{}", base, field),
            LValue::ArrayElem { base, index } => write!(f, "{}[{}]", base, index),
        }
    }
}

/// Right-hand sides of assignments.
#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    Immediate(Immediate),
    StaticField(Field),
    InstanceField { base: Local, field: Field },
    ArrayElem { base: Local, index: Immediate },
    Binary { op: BinOp, lhs: Immediate, rhs: Immediate },
    Cast { op: Immediate, ty: Type },
    InstanceOf { op: Immediate, ty: Type },
    Invoke(Invoke),
    New(String),
    NewArray { elem: Type, size: Immediate },
    NewMultiArray { elem: Type, sizes: Vec<Immediate> },
    Length(Immediate),
    Neg(Immediate),
}

impl fmt::Display for RValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RValue::Immediate(imm) => write!(f, "{}", imm),
            RValue::StaticField(field) => write!(f, "{}", field),
            RValue::InstanceField { base, field } => write!(f, "{}.{}", base, field),
            RValue::ArrayElem { base, index } => write!(f, "{}[{}]", base, index),
            RValue::Binary { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            RValue::Cast { op, ty } => write!(f, "({}) {}", ty, op),
            RValue::InstanceOf { op, ty } => write!(f, "{} instanceof {}", op, ty),
            RValue::Invoke(invoke) => write!(f, "{}", invoke),
            RValue::New(class) => write!(f, "new {}", class),
            RValue::NewArray { elem, size } => write!(f, "newarray ({})[{}]", elem, size),
            RValue::NewMultiArray { elem, sizes } => {
                write!(f, "newmultiarray ({})", elem)?;
                for size in sizes {
                    write!(f, "[{}]", size)?;
                }
                Ok(())
            }
            RValue::Length(op) => write!(f, "lengthof {}", op),
            RValue::Neg(op) => write!(f, "neg {}", op),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { lhs: LValue, rhs: RValue },
    Goto { target: String },
    If { cond: Condition, target: String },
    Switch { key: Immediate, targets: Vec<String>, default: String },
    Invoke(Invoke),
    Return(Option<Immediate>),
    Throw(Immediate),
    /// Binding of parameters and `this`, e.g. `r0 := @this`.
    Identity { local: Local },
    Nop,
    EnterMonitor(Immediate),
    ExitMonitor(Immediate),
    Breakpoint,
}

impl Stmt {
    /// Statements without an effect on the observables.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Stmt::Identity { .. } | Stmt::Nop | Stmt::EnterMonitor(_) | Stmt::ExitMonitor(_) | Stmt::Breakpoint
        )
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Stmt::Goto { target } => write!(f, "goto {}", target),
            Stmt::If { cond, target } => write!(f, "if {} goto {}", cond, target),
            Stmt::Switch { key, targets, default } => {
                write!(f, "switch({}) {{ ", key)?;
                for target in targets {
                    write!(f, "goto {}; ", target)?;
                }
                write!(f, "default: goto {}; }}", default)
            }
            Stmt::Invoke(invoke) => write!(f, "{}", invoke),
            Stmt::Return(Some(imm)) => write!(f, "return {}", imm),
            Stmt::Return(None) => write!(f, "return"),
            Stmt::Throw(imm) => write!(f, "throw {}", imm),
            Stmt::Identity { local } => write!(f, "{} := @identity", local),
            Stmt::Nop => write!(f, "nop"),
            Stmt::EnterMonitor(imm) => write!(f, "entermonitor {}", imm),
            Stmt::ExitMonitor(imm) => write!(f, "exitmonitor {}", imm),
            Stmt::Breakpoint => write!(f, "breakpoint"),
        }
    }
}

/// A statement with the name of its label, if it is a jump target.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub label: Option<String>,
    pub stmt: Stmt,
}

impl Unit {
    pub fn new(stmt: Stmt) -> Self {
        Self { label: None, stmt }
    }

    pub fn labelled(label: impl Into<String>, stmt: Stmt) -> Self {
        Self {
            label: Some(label.into()),
            stmt,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}: {}", label, self.stmt),
            None => write!(f, "{}", self.stmt),
        }
    }
}

/// The body of one method.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub method: MethodRef,
    pub locals: Vec<Local>,
    /// Fields declared by the class of the method.
    pub fields: Vec<Field>,
    pub units: Vec<Unit>,
}

impl Body {
    pub fn new(method: MethodRef) -> Self {
        Self {
            method,
            locals: Vec::new(),
            fields: Vec::new(),
            units: Vec::new(),
        }
    }

    pub fn with_locals(mut self, locals: impl IntoIterator<Item = Local>) -> Self {
        self.locals.extend(locals);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn push(&mut self, unit: Unit) {
        self.units.push(unit);
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.method)?;
        for local in self.locals.iter() {
            writeln!(f, "    {} {};", local.ty, local.name)?;
        }
        for unit in self.units.iter() {
            match &unit.label {
                Some(label) => writeln!(f, "  {}:\n    {};", label, unit.stmt)?,
                None => writeln!(f, "    {};", unit.stmt)?,
            }
        }
        write!(f, "}}")
    }
}
