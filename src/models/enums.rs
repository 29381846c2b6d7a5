use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// The string literal is both the stored/wire value and the serde rename,
/// so JSON carries the ward vocabulary exactly as charted (accents and all).
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $s)]
                $variant
            ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Enfermeiro => "enfermeiro",
    Tecnico => "tecnico",
    Coordenacao => "coordenacao",
});

str_enum!(PatientStatus {
    Internado => "Internado",
    Observacao => "Observação",
    Reavaliacao => "Reavaliação",
    Alta => "Alta",
    TransferenciaUpa => "Transferência UPA",
    TransferenciaExterna => "Transferência Externa",
});

str_enum!(PendencyType {
    Nenhuma => "Nenhuma",
    SemPrescricaoMedica => "Sem prescrição médica",
    SemDieta => "Sem dieta",
    AguardandoExamesLaboratoriais => "Aguardando exames laboratoriais",
    AguardandoTomografia => "Aguardando Tomografia",
    AguardandoRaioX => "Aguardando Raio-X",
    AguardandoUltrassom => "Aguardando Ultrassom",
    ExamesAguardandoResultado => "Exames realizados, aguardando resultado",
    AguardandoAssistenteSocial => "Aguardando Assistente Social",
});

str_enum!(Corridor {
    Principal => "Corredor 1 | Principal",
    Comanejo => "Corredor 2 | Comanejo",
    RaioX => "Corredor 3 | Raio-X",
    SalaDeTrauma => "Sala de Trauma",
});

str_enum!(Specialty {
    CirurgiaGeral => "Cirurgia Geral",
    Neurologia => "Neurologia",
    Ortopedia => "Ortopedia",
    Urologia => "Urologia",
    OdontologiaBucomaxilo => "Odontologia/Bucomaxilo",
    Vascular => "Vascular",
    ClinicaMedica => "Clínica Médica",
    Outros => "Outros",
});

str_enum!(LeanSpecialty {
    CirurgiaGeral => "Cirurgia Geral",
    Neurologia => "Neurologia",
    Ortopedia => "Ortopedia",
    DentistaBucomaxilo => "Dentista/Bucomaxilo",
    Vascular => "Vascular",
});

str_enum!(DietType {
    SemPrescricao => "Sem prescrição",
    Suspensa => "Suspensa",
    Livre => "Livre",
    Pastosa => "Pastosa",
    Branda => "Branda",
    Liquida => "Líquida",
    Laxativa => "Laxativa",
    Dm => "DM",
    Has => "HAS",
});

str_enum!(Mobility {
    Deambula => "Deambula",
    DeambulaComAuxilio => "Deambula com auxilio",
    Acamado => "Acamado",
    RestritoAoLeito => "Restrito ao leito",
});

str_enum!(Situation {
    Maca => "Maca",
    Cadeira => "Cadeira",
});

str_enum!(Sex {
    Masculino => "Masculino",
    Feminino => "Feminino",
    Outro => "Outro",
});

impl PatientStatus {
    /// Statuses that place the patient in the outbound transfer flow.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::TransferenciaUpa | Self::TransferenciaExterna)
    }
}

impl PendencyType {
    /// Pendencies counted as flow bottlenecks on the census board.
    pub fn is_bottleneck(&self) -> bool {
        matches!(
            self,
            Self::SemPrescricaoMedica | Self::AguardandoExamesLaboratoriais
        )
    }
}

impl Specialty {
    pub const ALL: [Specialty; 8] = [
        Specialty::CirurgiaGeral,
        Specialty::Neurologia,
        Specialty::Ortopedia,
        Specialty::Urologia,
        Specialty::OdontologiaBucomaxilo,
        Specialty::Vascular,
        Specialty::ClinicaMedica,
        Specialty::Outros,
    ];
}
