//! Jurisdiction reference tables: courts of appeal and the first-instance
//! tribunals that sit beneath them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtOfAppeal {
    pub id: &'static str,
    pub name: &'static str,
    pub arabic_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstInstanceTribunal {
    pub id: &'static str,
    pub name: &'static str,
    pub arabic_name: &'static str,
    pub court_of_appeal_id: &'static str,
}

pub const COURTS_OF_APPEAL: &[CourtOfAppeal] = &[
    CourtOfAppeal {
        id: "rabat",
        name: "Cour d'Appel de Rabat",
        arabic_name: "محكمة الاستئناف بالرباط",
    },
    CourtOfAppeal {
        id: "casablanca",
        name: "Cour d'Appel de Casablanca",
        arabic_name: "محكمة الاستئناف بالدار البيضاء",
    },
    CourtOfAppeal {
        id: "kenitra",
        name: "Cour d'Appel de Kénitra",
        arabic_name: "محكمة الاستئناف بالقنيطرة",
    },
    CourtOfAppeal {
        id: "fes",
        name: "Cour d'Appel de Fès",
        arabic_name: "محكمة الاستئناف بفاس",
    },
    CourtOfAppeal {
        id: "meknes",
        name: "Cour d'Appel de Meknès",
        arabic_name: "محكمة الاستئناف بمكناس",
    },
    CourtOfAppeal {
        id: "marrakech",
        name: "Cour d'Appel de Marrakech",
        arabic_name: "محكمة الاستئناف بمراكش",
    },
    CourtOfAppeal {
        id: "agadir",
        name: "Cour d'Appel d'Agadir",
        arabic_name: "محكمة الاستئناف بأكادير",
    },
    CourtOfAppeal {
        id: "oujda",
        name: "Cour d'Appel d'Oujda",
        arabic_name: "محكمة الاستئناف بوجدة",
    },
    CourtOfAppeal {
        id: "tetouan",
        name: "Cour d'Appel de Tétouan",
        arabic_name: "محكمة الاستئناف بتطوان",
    },
    CourtOfAppeal {
        id: "laayoune",
        name: "Cour d'Appel de Laâyoune",
        arabic_name: "محكمة الاستئناف بالعيون",
    },
];

pub const FIRST_INSTANCE_TRIBUNALS: &[FirstInstanceTribunal] = &[
    // ── Rabat ──
    FirstInstanceTribunal {
        id: "rabat-tgi",
        name: "Tribunal de Grande Instance de Rabat",
        arabic_name: "المحكمة الابتدائية بالرباط",
        court_of_appeal_id: "rabat",
    },
    FirstInstanceTribunal {
        id: "sale-tgi",
        name: "Tribunal de Grande Instance de Salé",
        arabic_name: "المحكمة الابتدائية بسلا",
        court_of_appeal_id: "rabat",
    },
    FirstInstanceTribunal {
        id: "temara-tgi",
        name: "Tribunal de Grande Instance de Témara",
        arabic_name: "المحكمة الابتدائية بتمارة",
        court_of_appeal_id: "rabat",
    },
    // ── Casablanca ──
    FirstInstanceTribunal {
        id: "casablanca-tgi",
        name: "Tribunal de Grande Instance de Casablanca",
        arabic_name: "المحكمة الابتدائية بالدار البيضاء",
        court_of_appeal_id: "casablanca",
    },
    FirstInstanceTribunal {
        id: "mohammedia-tgi",
        name: "Tribunal de Grande Instance de Mohammedia",
        arabic_name: "المحكمة الابتدائية بالمحمدية",
        court_of_appeal_id: "casablanca",
    },
    FirstInstanceTribunal {
        id: "settat-tgi",
        name: "Tribunal de Grande Instance de Settat",
        arabic_name: "المحكمة الابتدائية بسطات",
        court_of_appeal_id: "casablanca",
    },
    // ── Kénitra ──
    FirstInstanceTribunal {
        id: "kenitra-tgi",
        name: "Tribunal de Grande Instance de Kénitra",
        arabic_name: "المحكمة الابتدائية بالقنيطرة",
        court_of_appeal_id: "kenitra",
    },
    FirstInstanceTribunal {
        id: "sidi-kacem-tgi",
        name: "Tribunal de Grande Instance de Sidi Kacem",
        arabic_name: "المحكمة الابتدائية بسيدي قاسم",
        court_of_appeal_id: "kenitra",
    },
    // ── Fès ──
    FirstInstanceTribunal {
        id: "fes-tgi",
        name: "Tribunal de Grande Instance de Fès",
        arabic_name: "المحكمة الابتدائية بفاس",
        court_of_appeal_id: "fes",
    },
    FirstInstanceTribunal {
        id: "taza-tgi",
        name: "Tribunal de Grande Instance de Taza",
        arabic_name: "المحكمة الابتدائية بتازة",
        court_of_appeal_id: "fes",
    },
    // ── Marrakech ──
    FirstInstanceTribunal {
        id: "marrakech-tgi",
        name: "Tribunal de Grande Instance de Marrakech",
        arabic_name: "المحكمة الابتدائية بمراكش",
        court_of_appeal_id: "marrakech",
    },
    FirstInstanceTribunal {
        id: "essaouira-tgi",
        name: "Tribunal de Grande Instance d'Essaouira",
        arabic_name: "المحكمة الابتدائية بالصويرة",
        court_of_appeal_id: "marrakech",
    },
];

pub fn court_of_appeal(id: &str) -> Option<&'static CourtOfAppeal> {
    COURTS_OF_APPEAL.iter().find(|c| c.id == id)
}

pub fn first_instance_tribunal(id: &str) -> Option<&'static FirstInstanceTribunal> {
    FIRST_INSTANCE_TRIBUNALS.iter().find(|t| t.id == id)
}

/// Tribunals under the given court of appeal, in table order.
pub fn tribunals_for(court_of_appeal_id: &str) -> impl Iterator<Item = &'static FirstInstanceTribunal> {
    FIRST_INSTANCE_TRIBUNALS
        .iter()
        .filter(move |t| t.court_of_appeal_id == court_of_appeal_id)
}
