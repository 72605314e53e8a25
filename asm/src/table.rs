use crate::{error::Error, program::Program};
use arch::profile::Profile;
use serde::{Deserialize, Serialize};

/// What the uploader needs next to the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub profile: Profile,
    pub crc: u16,
    pub size: usize,
    pub subroutines: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub command: u8,
    pub address: u16,
}

impl Table {
    pub fn new(program: &Program) -> Self {
        let subroutines = program
            .subroutine_commands()
            .iter()
            .map(|(name, &command)| Entry {
                name: name.clone(),
                command,
                address: program
                    .subroutine_addresses()
                    .get(name)
                    .copied()
                    .unwrap_or(0),
            })
            .collect();
        Table {
            profile: program.profile(),
            crc: program.crc(),
            size: program.byte_list().len(),
            subroutines,
        }
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        serde_yaml::to_string(self).map_err(Error::TableEncode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn entries_follow_declaration_order() {
        let program = compile("zeta quit\nsub beta return\nsub zeta return", "script", Profile::Micro).unwrap();
        let table = Table::new(&program);
        assert_eq!(table.size, 4);
        assert_eq!(table.crc, program.crc());
        let names: Vec<(&str, u8, u16)> = table
            .subroutines
            .iter()
            .map(|e| (e.name.as_str(), e.command, e.address))
            .collect();
        assert_eq!(names, vec![("BETA", 128, 2), ("ZETA", 129, 3)]);
    }

    #[test]
    fn yaml_reads_back() {
        let program = compile("sub a 1 return", "script", Profile::Mini).unwrap();
        let table = Table::new(&program);
        let yaml = table.to_yaml().unwrap();
        assert!(yaml.contains("profile: Mini"));
        let back: Table = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, table);
    }
}
