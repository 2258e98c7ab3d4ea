//! Canonical book list: codes, ordering and USFM file names.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

/// One entry of the canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonBook {
    /// Lower-case book code as stored by the content store (`gen`, `mat`).
    pub code: &'static str,
    /// Sort number used in USFM file names (`01`..`39`, `41`..`67`).
    pub number: u8,
    pub testament: Testament,
}

impl CanonBook {
    /// Upper-case USFM book identifier (`GEN`).
    pub fn usfm_id(&self) -> String {
        self.code.to_ascii_uppercase()
    }

    /// Canonical file name, e.g. `01-GEN.usfm`.
    pub fn usfm_file_name(&self) -> String {
        format!("{:02}-{}.usfm", self.number, self.usfm_id())
    }
}

const fn ot(code: &'static str, number: u8) -> CanonBook {
    CanonBook {
        code,
        number,
        testament: Testament::Old,
    }
}

const fn nt(code: &'static str, number: u8) -> CanonBook {
    CanonBook {
        code,
        number,
        testament: Testament::New,
    }
}

pub const CANON: [CanonBook; 66] = [
    ot("gen", 1),
    ot("exo", 2),
    ot("lev", 3),
    ot("num", 4),
    ot("deu", 5),
    ot("jos", 6),
    ot("jdg", 7),
    ot("rut", 8),
    ot("1sa", 9),
    ot("2sa", 10),
    ot("1ki", 11),
    ot("2ki", 12),
    ot("1ch", 13),
    ot("2ch", 14),
    ot("ezr", 15),
    ot("neh", 16),
    ot("est", 17),
    ot("job", 18),
    ot("psa", 19),
    ot("pro", 20),
    ot("ecc", 21),
    ot("sng", 22),
    ot("isa", 23),
    ot("jer", 24),
    ot("lam", 25),
    ot("ezk", 26),
    ot("dan", 27),
    ot("hos", 28),
    ot("jol", 29),
    ot("amo", 30),
    ot("oba", 31),
    ot("jon", 32),
    ot("mic", 33),
    ot("nam", 34),
    ot("hab", 35),
    ot("zep", 36),
    ot("hag", 37),
    ot("zec", 38),
    ot("mal", 39),
    nt("mat", 41),
    nt("mrk", 42),
    nt("luk", 43),
    nt("jhn", 44),
    nt("act", 45),
    nt("rom", 46),
    nt("1co", 47),
    nt("2co", 48),
    nt("gal", 49),
    nt("eph", 50),
    nt("php", 51),
    nt("col", 52),
    nt("1th", 53),
    nt("2th", 54),
    nt("1ti", 55),
    nt("2ti", 56),
    nt("tit", 57),
    nt("phm", 58),
    nt("heb", 59),
    nt("jas", 60),
    nt("1pe", 61),
    nt("2pe", 62),
    nt("1jn", 63),
    nt("2jn", 64),
    nt("3jn", 65),
    nt("jud", 66),
    nt("rev", 67),
];

/// Look up a book by code, case-insensitively.
pub fn lookup(code: &str) -> Option<&'static CanonBook> {
    CANON.iter().find(|b| b.code.eq_ignore_ascii_case(code))
}

/// Canonical USFM file name for a book code, if the code is known.
pub fn usfm_file_name(code: &str) -> Option<String> {
    lookup(code).map(CanonBook::usfm_file_name)
}
