//! # Manifest scripts
//!
//! A [`ManifestScript`] is the ordered list of ledger operations that the ledger executes as
//! one atomic transaction, interleaved with human readable comments. The router appends
//! operations through [`ManifestScript::emit`] and the typed helpers around it; how the
//! ledger encodes them is left to whoever submits the script. [`ManifestScript::render`]
//! produces the Radix transaction-manifest text form.
//!
//! Resources returned by calls land on the worktop. Buckets and proofs taken from there
//! are named slots. Within one script a slot name is declared once and consumed at most
//! once; the script refuses anything else.

use std::collections::{HashMap, HashSet};

use scrypto::prelude::{ComponentAddress, Decimal, NetworkDefinition, ResourceAddress};

use crate::error::{Error, Result};
use crate::resources::encode_address;

/// An argument of a method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestArg {
    Component(ComponentAddress),
    Resource(ResourceAddress),
    Decimal(Decimal),
    Bool(bool),
    String(String),
    Bucket(String),
    Proof(String),
    Tuple(Vec<ManifestArg>),
    Enum(u8, Vec<ManifestArg>),
    Map {
        key_kind: &'static str,
        value_kind: &'static str,
        entries: Vec<(ManifestArg, ManifestArg)>,
    },
}

impl ManifestArg {
    pub fn bucket(name: impl Into<String>) -> Self {
        ManifestArg::Bucket(name.into())
    }

    pub fn proof(name: impl Into<String>) -> Self {
        ManifestArg::Proof(name.into())
    }

    /// The manifest value kind, as used in `Map<K, V>` type parameters.
    pub fn kind(&self) -> &'static str {
        match self {
            ManifestArg::Component(_) | ManifestArg::Resource(_) => "Address",
            ManifestArg::Decimal(_) => "Decimal",
            ManifestArg::Bool(_) => "Bool",
            ManifestArg::String(_) => "String",
            ManifestArg::Bucket(_) => "Bucket",
            ManifestArg::Proof(_) => "Proof",
            ManifestArg::Tuple(_) => "Tuple",
            ManifestArg::Enum(_, _) => "Enum",
            ManifestArg::Map { .. } => "Map",
        }
    }

    fn collect_slots<'a>(&'a self, slots: &mut Vec<(&'a str, SlotKind)>) {
        match self {
            ManifestArg::Bucket(name) => slots.push((name.as_str(), SlotKind::Bucket)),
            ManifestArg::Proof(name) => slots.push((name.as_str(), SlotKind::Proof)),
            ManifestArg::Tuple(fields) | ManifestArg::Enum(_, fields) => {
                fields.iter().for_each(|field| field.collect_slots(slots))
            }
            ManifestArg::Map { entries, .. } => entries.iter().for_each(|(key, value)| {
                key.collect_slots(slots);
                value.collect_slots(slots);
            }),
            _ => {}
        }
    }

    fn render(&self, network: &NetworkDefinition) -> Result<String> {
        Ok(match self {
            ManifestArg::Component(address) => {
                format!("Address(\"{}\")", encode_address(network, address.as_node_id())?)
            }
            ManifestArg::Resource(address) => {
                format!("Address(\"{}\")", encode_address(network, address.as_node_id())?)
            }
            ManifestArg::Decimal(value) => format!("Decimal(\"{}\")", value),
            ManifestArg::Bool(value) => value.to_string(),
            ManifestArg::String(value) => format!("{:?}", value),
            ManifestArg::Bucket(name) => format!("Bucket(\"{}\")", name),
            ManifestArg::Proof(name) => format!("Proof(\"{}\")", name),
            ManifestArg::Tuple(fields) => format!("Tuple({})", render_list(fields, network)?),
            ManifestArg::Enum(discriminator, fields) => format!(
                "Enum<{}u8>({})",
                discriminator,
                render_list(fields, network)?
            ),
            ManifestArg::Map {
                key_kind,
                value_kind,
                entries,
            } => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| {
                        Ok(format!("{} => {}", key.render(network)?, value.render(network)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                format!("Map<{}, {}>({})", key_kind, value_kind, entries.join(", "))
            }
        })
    }
}

fn render_list(args: &[ManifestArg], network: &NetworkDefinition) -> Result<String> {
    Ok(args
        .iter()
        .map(|arg| arg.render(network))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

/// A primitive ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    CallMethod {
        address: ComponentAddress,
        method: String,
        args: Vec<ManifestArg>,
    },
    TakeFromWorktop {
        resource: ResourceAddress,
        amount: Decimal,
        bucket: String,
    },
    TakeAllFromWorktop {
        resource: ResourceAddress,
        bucket: String,
    },
    PopFromAuthZone {
        proof: String,
    },
}

impl Instruction {
    fn render(&self, network: &NetworkDefinition) -> Result<String> {
        let mut lines: Vec<String> = Vec::new();
        match self {
            Instruction::CallMethod {
                address,
                method,
                args,
            } => {
                lines.push("CALL_METHOD".to_string());
                lines.push(ManifestArg::Component(*address).render(network)?);
                lines.push(format!("{:?}", method));
                for arg in args {
                    lines.push(arg.render(network)?);
                }
            }
            Instruction::TakeFromWorktop {
                resource,
                amount,
                bucket,
            } => {
                lines.push("TAKE_FROM_WORKTOP".to_string());
                lines.push(ManifestArg::Resource(*resource).render(network)?);
                lines.push(ManifestArg::Decimal(*amount).render(network)?);
                lines.push(ManifestArg::bucket(bucket.as_str()).render(network)?);
            }
            Instruction::TakeAllFromWorktop { resource, bucket } => {
                lines.push("TAKE_ALL_FROM_WORKTOP".to_string());
                lines.push(ManifestArg::Resource(*resource).render(network)?);
                lines.push(ManifestArg::bucket(bucket.as_str()).render(network)?);
            }
            Instruction::PopFromAuthZone { proof } => {
                lines.push("POP_FROM_AUTH_ZONE".to_string());
                lines.push(ManifestArg::proof(proof.as_str()).render(network)?);
            }
        }

        let mut out = lines[0].clone();
        for line in &lines[1..] {
            out.push_str("\n    ");
            out.push_str(line);
        }
        out.push_str("\n;");
        Ok(out)
    }

    fn declared_slot(&self) -> Option<(&str, SlotKind)> {
        match self {
            Instruction::TakeFromWorktop { bucket, .. }
            | Instruction::TakeAllFromWorktop { bucket, .. } => {
                Some((bucket.as_str(), SlotKind::Bucket))
            }
            Instruction::PopFromAuthZone { proof } => Some((proof.as_str(), SlotKind::Proof)),
            Instruction::CallMethod { .. } => None,
        }
    }

    fn consumed_slots(&self) -> Vec<(&str, SlotKind)> {
        let mut slots = Vec::new();
        if let Instruction::CallMethod { args, .. } = self {
            args.iter().for_each(|arg| arg.collect_slots(&mut slots));
        }
        slots
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Bucket,
    Proof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Comment(String),
    Blank,
    Instruction(Instruction),
}

/// An ordered, commented ledger operation script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestScript {
    lines: Vec<ManifestLine>,
    declared: HashSet<String>,
    live: HashMap<String, SlotKind>,
}

impl ManifestScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(ManifestLine::Comment(text.into()));
        self
    }

    pub fn blank_line(&mut self) -> &mut Self {
        self.lines.push(ManifestLine::Blank);
        self
    }

    /// Appends an operation after checking the slots it consumes and declares.
    pub fn emit(&mut self, instruction: Instruction) -> Result<&mut Self> {
        let consumed = instruction.consumed_slots();
        let mut seen = HashSet::new();
        for (name, kind) in &consumed {
            if self.live.get(*name) != Some(kind) || !seen.insert(*name) {
                return Err(Error::UnknownSlot(name.to_string()));
            }
        }
        if let Some((name, _)) = instruction.declared_slot() {
            if self.declared.contains(name) {
                return Err(Error::DuplicateSlot(name.to_string()));
            }
        }

        for (name, _) in &consumed {
            self.live.remove(*name);
        }
        if let Some((name, kind)) = instruction.declared_slot() {
            self.declared.insert(name.to_string());
            self.live.insert(name.to_string(), kind);
        }

        self.lines.push(ManifestLine::Instruction(instruction));
        Ok(self)
    }

    pub fn call_method(
        &mut self,
        address: ComponentAddress,
        method: &str,
        args: Vec<ManifestArg>,
    ) -> Result<&mut Self> {
        self.emit(Instruction::CallMethod {
            address,
            method: method.to_string(),
            args,
        })
    }

    pub fn take_from_worktop(
        &mut self,
        resource: ResourceAddress,
        amount: Decimal,
        bucket: &str,
    ) -> Result<&mut Self> {
        self.emit(Instruction::TakeFromWorktop {
            resource,
            amount,
            bucket: bucket.to_string(),
        })
    }

    pub fn take_all_from_worktop(
        &mut self,
        resource: ResourceAddress,
        bucket: &str,
    ) -> Result<&mut Self> {
        self.emit(Instruction::TakeAllFromWorktop {
            resource,
            bucket: bucket.to_string(),
        })
    }

    pub fn pop_from_auth_zone(&mut self, proof: &str) -> Result<&mut Self> {
        self.emit(Instruction::PopFromAuthZone {
            proof: proof.to_string(),
        })
    }

    pub fn lines(&self) -> &[ManifestLine] {
        &self.lines
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|line| match line {
            ManifestLine::Instruction(instruction) => Some(instruction),
            _ => None,
        })
    }

    /// Whether a bucket or proof with this name is still held by the script.
    pub fn is_live(&self, slot: &str) -> bool {
        self.live.contains_key(slot)
    }

    /// Renders the script as Radix transaction-manifest text.
    pub fn render(&self, network: &NetworkDefinition) -> Result<String> {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                ManifestLine::Comment(text) => out.push_str(&format!("# {}", text)),
                ManifestLine::Blank => {}
                ManifestLine::Instruction(instruction) => {
                    out.push_str(&instruction.render(network)?)
                }
            }
            out.push('\n');
        }
        Ok(out)
    }
}
