//! Static catalog of the equipment and vehicle categories an airside
//! operating license can cover. Applicants pick from this list; the sectional
//! manager may confirm or extend the selection but never outside it.

/// One selectable equipment/vehicle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
}

pub const CATEGORIES: [Category; 21] = [
    Category { key: "tractor", label: "Tractor" },
    Category { key: "transporter", label: "Transporter" },
    Category { key: "acuAsuGpu", label: "ACU/ ASU/ GPU" },
    Category { key: "paxCoach", label: "Pax-coach" },
    Category { key: "forkliftPalletMover", label: "Fork-lift/Pallet Mover" },
    Category { key: "buggy", label: "Buggy" },
    Category { key: "pickUp", label: "Pick-up" },
    Category { key: "lorryAcBus", label: "Lorry/ A/C Bus" },
    Category { key: "toiletWaterCart", label: "Toilet/ Water cart" },
    Category { key: "paxStep", label: "Pax step" },
    Category { key: "ambulift", label: "Ambulift" },
    Category { key: "van", label: "Van" },
    Category { key: "donkeyLift", label: "Donkey-lift" },
    Category { key: "acTowTug", label: "A/C Tow-Tug" },
    Category { key: "jcpMdLoader", label: "JCP/MD/Loader" },
    Category { key: "hiLiftCatering", label: "Hi-lift (Catering)" },
    Category { key: "car", label: "Car" },
    Category { key: "snorkelLift", label: "Snorkel-lift" },
    Category { key: "maintPlatLiftTruck", label: "Maint-Plat-Lift-Truck" },
    Category { key: "skyLoader", label: "Sky loader" },
    Category { key: "ev", label: "EV" },
];

pub fn is_known(key: &str) -> bool {
    CATEGORIES.iter().any(|category| category.key == key)
}

pub fn label_for(key: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|category| category.key == key)
        .map(|category| category.label)
}
