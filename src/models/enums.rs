use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A wire string that matches no variant of a domain enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {field}: {value}")]
pub struct EnumParseError {
    pub field: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr, plus serde impls
/// that speak the backend's SCREAMING_SNAKE wire strings.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(EnumParseError {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

wire_enum!(StatusTratamento {
    EmTratamento => "EM_TRATAMENTO",
    AltaMedica => "ALTA_MEDICA",
    AbandonouTratamento => "ABANDONOU_TRATAMENTO",
    Transferido => "TRANSFERIDO",
});

wire_enum!(TipoTratamento {
    TerapiaIndividual => "TERAPIA_INDIVIDUAL",
    TerapiaCasal => "TERAPIA_CASAL",
    TerapiaGrupo => "TERAPIA_GRUPO",
    TerapiaFamiliar => "TERAPIA_FAMILIAR",
    Outro => "OUTRO",
});

wire_enum!(Genero {
    Masculino => "MASCULINO",
    Feminino => "FEMININO",
    Outro => "OUTRO",
    NaoInformado => "NAO_INFORMADO",
});
