use std::fmt;
use std::str::FromStr;

/// 상태 코드 범위 파싱 에러
#[derive(Debug, Clone, PartialEq)]
pub enum RangeParseError {
    /// 빈 블록 (예: "200,,300")
    EmptyBlock,
    /// 숫자가 아닌 코드
    InvalidCode {
        block: String,
        code: String,
    },
    /// 하한이 상한보다 큼
    InvertedRange {
        block: String,
        low: u16,
        high: u16,
    },
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeParseError::EmptyBlock =>
                write!(f, "빈 상태 코드 블록"),
            RangeParseError::InvalidCode { block, code } =>
                write!(f, "블록 {}의 상태 코드 {}가 숫자가 아님", block, code),
            RangeParseError::InvertedRange { block, low, high } =>
                write!(f, "블록 {}의 하한 {}이 상한 {}보다 큼", block, low, high),
        }
    }
}

impl std::error::Error for RangeParseError {}

/// 포함 구간 `[low, high]`의 목록
///
/// 입력 순서대로 저장하며 병합하거나 정렬하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpCodeRanges(Vec<(u16, u16)>);

impl HttpCodeRanges {
    /// `"200-299,400,450-499"` 형식의 블록들을 파싱합니다.
    ///
    /// 문자열 하나에 쉼표로 이어 붙여도, 미리 나눈 여러 문자열로 넘겨도 결과는 같습니다.
    pub fn new<S: AsRef<str>>(blocks: &[S]) -> Result<Self, RangeParseError> {
        let mut ranges = Vec::new();

        for entry in blocks {
            for block in entry.as_ref().split(',') {
                ranges.push(parse_block(block.trim())?);
            }
        }

        Ok(Self(ranges))
    }

    pub fn contains(&self, code: u16) -> bool {
        self.0.iter().any(|&(low, high)| low <= code && code <= high)
    }

    pub fn as_slice(&self) -> &[(u16, u16)] {
        &self.0
    }
}

impl FromStr for HttpCodeRanges {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(&[s])
    }
}

fn parse_block(block: &str) -> Result<(u16, u16), RangeParseError> {
    if block.is_empty() {
        return Err(RangeParseError::EmptyBlock);
    }

    let parse_code = |code: &str| {
        code.trim().parse::<u16>().map_err(|_| RangeParseError::InvalidCode {
            block: block.to_string(),
            code: code.to_string(),
        })
    };

    let (low, high) = match block.split_once('-') {
        Some((low, high)) => (parse_code(low)?, parse_code(high)?),
        None => {
            let code = parse_code(block)?;
            (code, code)
        }
    };

    if low > high {
        return Err(RangeParseError::InvertedRange {
            block: block.to_string(),
            low,
            high,
        });
    }

    Ok((low, high))
}
