use super::{Db, models::*};
use rusqlite::{Result, params};

impl Db {
    /// Inserts or replaces surah rows in one transaction.
    pub fn upsert_surahs(&mut self, surahs: &[Surah]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO surah (id, name_simple, name_arabic, revelation_place, verses_count)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for s in surahs {
                stmt.execute(params![
                    s.id,
                    s.name_simple,
                    s.name_arabic,
                    s.revelation_place,
                    s.verses_count
                ])?;
            }
        }
        tx.commit()?;
        Ok(surahs.len())
    }

    /// Inserts or replaces ayah rows in one transaction.
    pub fn upsert_ayahs(&mut self, ayahs: &[Ayah]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO ayah
                 (id, surah_id, verse_number, page_number, juz_number, text_uthmani, translation_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for a in ayahs {
                stmt.execute(params![
                    a.id,
                    a.surah_id,
                    a.verse_number,
                    a.page_number,
                    a.juz_number,
                    a.text_uthmani,
                    a.translation
                ])?;
            }
        }
        tx.commit()?;
        Ok(ayahs.len())
    }

    /// Returns `(id, translation)` for every ayah.
    pub fn list_translations(&self) -> Result<Vec<AyahTranslation>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, translation_id FROM ayah ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(AyahTranslation {
                id: row.get(0)?,
                translation: row.get(1)?,
            })
        })?;
        rows.collect()
    }

    /// Rewrites translations by ayah id in one transaction.
    pub fn update_translations(&mut self, updates: &[AyahTranslation]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE ayah SET translation_id = ? WHERE id = ?")?;
            for u in updates {
                changed += stmt.execute(params![u.translation, u.id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// The first `limit` ayahs of a surah, by verse number.
    pub fn sample_ayahs(&self, surah_id: i64, limit: usize) -> Result<Vec<AyahSample>> {
        let mut stmt = self.conn.prepare(
            "SELECT surah_id, verse_number, translation_id FROM ayah
             WHERE surah_id = ? ORDER BY verse_number LIMIT ?",
        )?;
        let rows = stmt.query_map(params![surah_id, limit as i64], |row| {
            Ok(AyahSample {
                surah_id: row.get(0)?,
                verse_number: row.get(1)?,
                translation: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    pub fn count_surahs(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM surah", [], |row| row.get(0))
    }

    pub fn count_ayahs(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM ayah", [], |row| row.get(0))
    }
}
