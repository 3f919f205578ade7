//! Built-in administrative table.
//!
//! Kigali City and the Eastern province carry their full sector lists; the
//! other provinces list the sectors covered by the current field rollout. A
//! complete table can be supplied as JSON through `hierarchy_path`.

pub(super) type DistrictRow = (&'static str, &'static [&'static str]);
pub(super) type ProvinceRow = (&'static str, &'static [DistrictRow]);

pub(super) const PROVINCES: &[ProvinceRow] = &[
    (
        "Kigali City",
        &[
            (
                "Gasabo",
                &[
                    "Bumbogo", "Gatsata", "Gikomero", "Gisozi", "Jabana", "Jali", "Kacyiru",
                    "Kimihurura", "Kimironko", "Kinyinya", "Ndera", "Nduba", "Remera",
                    "Rusororo", "Rutunga",
                ],
            ),
            (
                "Kicukiro",
                &[
                    "Gahanga", "Gatenga", "Gikondo", "Kagarama", "Kanombe", "Kicukiro",
                    "Kigarama", "Masaka", "Niboye", "Nyarugunga",
                ],
            ),
            (
                "Nyarugenge",
                &[
                    "Gitega", "Kanyinya", "Kigali", "Kimisagara", "Mageragere", "Muhima",
                    "Nyakabanda", "Nyamirambo", "Nyarugenge", "Rwezamenyo",
                ],
            ),
        ],
    ),
    (
        "Eastern",
        &[
            (
                "Bugesera",
                &[
                    "Gashora", "Juru", "Kamabuye", "Mareba", "Mayange", "Musenyi", "Mwogo",
                    "Ngeruka", "Ntarama", "Nyamata", "Nyarugenge", "Rilima", "Ruhuha", "Rweru",
                    "Shyara",
                ],
            ),
            (
                "Gatsibo",
                &[
                    "Gasange", "Gatsibo", "Gitoki", "Kabarore", "Kageyo", "Kiramuruzi",
                    "Kiziguro", "Muhura", "Murambi", "Ngarama", "Nyagihanga", "Remera",
                    "Rugarama", "Rwimbogo",
                ],
            ),
            (
                "Kayonza",
                &[
                    "Gahini", "Kabare", "Kabarondo", "Mukarange", "Murama", "Murundi", "Mwiri",
                    "Ndego", "Nyamirama", "Rukara", "Ruramira", "Rwinkwavu",
                ],
            ),
            (
                "Kirehe",
                &[
                    "Gahara", "Gatore", "Kigarama", "Kigina", "Kirehe", "Mahama", "Mpanga",
                    "Musaza", "Mushikiri", "Nasho", "Nyamugari", "Nyarubuye",
                ],
            ),
            (
                "Ngoma",
                &[
                    "Gashanda", "Jarama", "Karembo", "Kazo", "Kibungo", "Mugesera", "Murama",
                    "Mutenderi", "Remera", "Rukira", "Rukumberi", "Rurenge", "Sake", "Zaza",
                ],
            ),
            (
                "Nyagatare",
                &[
                    "Gatunda", "Karama", "Karangazi", "Katabagemu", "Kiyombe", "Matimba",
                    "Mimuri", "Mukama", "Musheri", "Nyagatare", "Rukomo", "Rwempasha",
                    "Rwimiyaga", "Tabagwe",
                ],
            ),
            (
                "Rwamagana",
                &[
                    "Fumbwe", "Gahengeri", "Gishari", "Karenge", "Kigabiro", "Muhazi",
                    "Munyaga", "Munyiginya", "Musha", "Muyumbu", "Mwulire", "Nyakariro",
                    "Nzige", "Rubona",
                ],
            ),
        ],
    ),
    (
        "Northern",
        &[
            ("Burera", &["Butaro", "Cyanika", "Gahunga", "Kinoni", "Rugarama", "Rusarabuye"]),
            ("Gakenke", &["Gakenke", "Janja", "Kivuruga", "Muzo", "Nemba", "Ruli"]),
            ("Gicumbi", &["Byumba", "Kageyo", "Manyagiro", "Mukarange", "Rukomo", "Rutare"]),
            (
                "Musanze",
                &[
                    "Busogo", "Cyuve", "Gacaca", "Gashaki", "Gataraga", "Kimonyi", "Kinigi",
                    "Muhoza", "Muko", "Musanze", "Nkotsi", "Nyange", "Remera", "Rwaza",
                    "Shingiro",
                ],
            ),
            ("Rulindo", &["Base", "Bushoki", "Buyoga", "Rusiga", "Shyorongi", "Tumba"]),
        ],
    ),
    (
        "Southern",
        &[
            ("Gisagara", &["Gikonko", "Kansi", "Mamba", "Mugombwa", "Ndora", "Save"]),
            (
                "Huye",
                &[
                    "Gishamvu", "Huye", "Karama", "Kigoma", "Kinazi", "Maraba", "Mbazi",
                    "Mukura", "Ngoma", "Ruhashya", "Rusatira", "Rwaniro", "Simbi", "Tumba",
                ],
            ),
            ("Kamonyi", &["Gacurabwenge", "Karama", "Mugina", "Runda", "Rugalika", "Rukoma"]),
            ("Muhanga", &["Cyeza", "Kabacuzi", "Muhanga", "Nyamabuye", "Shyogwe", "Rongi"]),
            ("Nyamagabe", &["Gasaka", "Kaduha", "Kitabi", "Mugano", "Tare", "Uwinkingi"]),
            ("Nyanza", &["Busasamana", "Cyabakamyi", "Kigoma", "Mukingo", "Nyagisozi", "Rwabicuma"]),
            ("Nyaruguru", &["Busanze", "Kibeho", "Munini", "Ngera", "Ruheru", "Ruramba"]),
            ("Ruhango", &["Byimana", "Kabagari", "Kinazi", "Mwendo", "Ntongwe", "Ruhango"]),
        ],
    ),
    (
        "Western",
        &[
            ("Karongi", &["Bwishyura", "Gishyita", "Mubuga", "Murambi", "Rubengera", "Rugabano"]),
            ("Ngororero", &["Gatumba", "Hindiro", "Kabaya", "Muhororo", "Ngororero", "Sovu"]),
            ("Nyabihu", &["Bigogwe", "Jenda", "Jomba", "Kabatwa", "Mukamira", "Rambura"]),
            ("Nyamasheke", &["Bushekeri", "Cyato", "Kagano", "Kanjongo", "Karambi", "Ruharambuga"]),
            (
                "Rubavu",
                &[
                    "Bugeshi", "Busasamana", "Cyanzarwe", "Gisenyi", "Kanama", "Kanzenze",
                    "Mudende", "Nyakiliba", "Nyamyumba", "Nyundo", "Rubavu", "Rugerero",
                ],
            ),
            ("Rusizi", &["Bugarama", "Gihundwe", "Kamembe", "Mururu", "Nyakabuye", "Nzahaha"]),
            ("Rutsiro", &["Boneza", "Gihango", "Kigeyo", "Manihira", "Mushubati", "Nyabirasi"]),
        ],
    ),
];
