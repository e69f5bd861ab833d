use crate::{ContractModel, InitialValue, SemanticType};
use std::fmt;

impl fmt::Display for ContractModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "contract {} {{", self.name)?;

        for (name, slot) in &self.storage_slots {
            write!(f, "    slot {slot}: {name}: ")?;
            match self.mapping(name) {
                Some(mapping) => write!(f, "mapping({} => {})", mapping.key, mapping.value)?,
                None => write!(f, "{}", self.variable_type(name).unwrap_or(SemanticType::Uint256))?,
            }
            match self.initial_value(name) {
                InitialValue::Word(value) => writeln!(f, " = {value:#x}")?,
                InitialValue::EmptyMapping => writeln!(f, " = {{}}")?,
            }
        }

        for event in self.events.values() {
            let params: Vec<_> = event.params.iter().map(|ty| ty.as_str()).collect();
            writeln!(f, "    event {}({})", event.name, params.join(", "))?;
        }

        for func in self.functions.values() {
            let params: Vec<_> =
                func.params.iter().map(|p| format!("{} {}", p.ty, p.name)).collect();
            write!(f, "    {} {}({})", func.visibility.as_str(), func.name, params.join(", "))?;
            if func.has_output() {
                write!(f, " -> {}", func.return_type)?;
            }
            writeln!(f)?;
        }

        write!(f, "}}")
    }
}
