//! Built-in game set that guarantees the menu is never empty, even without
//! the JSON fixture or any reachable spreadsheet.

use crate::domain::{ClueType, GameSet, QuestionRecord};

pub const SEED_SET_ID: &str = "rosco-demo";

pub fn seed_game_set() -> GameSet {
  use ClueType::{Contains, StartsWith};
  GameSet::new(SEED_SET_ID, "Rosco de Prueba", vec![
    QuestionRecord::new('A', StartsWith, "Capital de Argentina", "Buenos Aires"),
    QuestionRecord::new('B', StartsWith, "Prócer que creó la bandera argentina", "Belgrano"),
    QuestionRecord::new('C', StartsWith, "Río santafesino afluente del Paraná", "Carcarañá"),
    QuestionRecord::new('M', StartsWith, "Infusión tradicional que se toma con bombilla", "Mate"),
    QuestionRecord::new('Ñ', Contains, "Ave corredora de la llanura pampeana", "Ñandú"),
    QuestionRecord::new('P', StartsWith, "Río que baña la costa de Rosario", "Paraná"),
    QuestionRecord::new('R', StartsWith, "Ciudad donde se izó por primera vez la bandera", "Rosario"),
    QuestionRecord::new('X', Contains, "Contiene X - Auto de alquiler con chofer", "Taxi"),
  ])
}
